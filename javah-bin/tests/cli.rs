use std::{fs, io::Write, path::Path};

use assert_cmd::Command;
use javah_class_file::testing::ClassFileBuilder;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

fn javah() -> Command {
    let mut cmd = Command::cargo_bin("javah").unwrap();
    cmd.env_remove("CLASSPATH").env_remove("RUST_LOG");
    cmd
}

fn write_class(root: &Path, name: &str, bytes: Vec<u8>) {
    let path = root.join(format!("{}.class", name));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

fn foo_class() -> Vec<u8> {
    ClassFileBuilder::new("com/example/Foo")
        .native_method("bar", "(Ljava/lang/String;)I")
        .build()
}

#[test]
fn help_lists_options() {
    javah().arg("--help").assert().success().stdout(
        predicate::str::contains("--class-path")
            .and(predicate::str::contains("--keep-going"))
            .and(predicate::str::contains("--emit-empty")),
    );
}

#[test]
fn writes_header_per_class_into_directory() {
    let temp = TempDir::new().unwrap();
    let classes = temp.path().join("classes");
    write_class(&classes, "com/example/Foo", foo_class());
    let out = temp.path().join("include");

    javah()
        .arg("-cp")
        .arg(&classes)
        .arg("-d")
        .arg(&out)
        .arg("com.example.Foo")
        .assert()
        .success();

    let header = fs::read_to_string(out.join("com_example_Foo.h")).unwrap();
    assert!(header.starts_with("/* DO NOT EDIT THIS FILE - it is machine generated */\n"));
    assert!(header.contains("JNIEXPORT jint JNICALL Java_com_example_Foo_bar\n  (JNIEnv *, jobject, jstring);\n"));
}

#[test]
fn resolves_classes_from_jars_into_one_file() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("lib.jar");
    let mut zip = ZipWriter::new(fs::File::create(&jar).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file("com/example/Foo.class", options).unwrap();
    zip.write_all(&foo_class()).unwrap();
    zip.start_file("com/example/Outer$Inner.class", options).unwrap();
    zip.write_all(
        &ClassFileBuilder::new("com/example/Outer$Inner")
            .inner_class("com/example/Outer$Inner", Some("com/example/Outer"), Some("Inner"), 0x0008)
            .static_native_method("run", "()V")
            .build(),
    )
    .unwrap();
    zip.finish().unwrap();
    let out = temp.path().join("all.h");

    javah()
        .arg("--class-path")
        .arg(&jar)
        .arg("-o")
        .arg(&out)
        .arg("com.example.Foo")
        .arg("com.example.Outer.Inner")
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.matches("DO NOT EDIT").count(), 1);
    let foo = text.find("Java_com_example_Foo_bar").unwrap();
    let inner = text.find("Java_com_example_Outer_00024Inner_run").unwrap();
    assert!(foo < inner);
}

#[test]
fn accepts_class_file_paths() {
    let temp = TempDir::new().unwrap();
    write_class(temp.path(), "Foo", foo_class());

    javah()
        .current_dir(temp.path())
        .arg("Foo.class")
        .assert()
        .success();

    assert!(temp.path().join("com_example_Foo.h").exists());
}

#[test]
fn missing_class_fails() {
    let temp = TempDir::new().unwrap();
    javah()
        .arg("-cp")
        .arg(temp.path())
        .arg("-d")
        .arg(temp.path())
        .arg("com.example.Missing")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("com.example.Missing").and(predicate::str::contains("not found")));
}

#[test]
fn keep_going_writes_what_it_can() {
    let temp = TempDir::new().unwrap();
    write_class(temp.path(), "com/example/Foo", foo_class());
    write_class(temp.path(), "com/example/Bad", vec![0xCA, 0xFE]);

    javah()
        .arg("-cp")
        .arg(temp.path())
        .arg("-d")
        .arg(temp.path())
        .arg("--keep-going")
        .arg("com.example.Bad")
        .arg("com.example.Foo")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("malformed class com.example.Bad"));

    assert!(temp.path().join("com_example_Foo.h").exists());
}

#[test]
fn emit_empty_writes_headers_without_prototypes() {
    let temp = TempDir::new().unwrap();
    write_class(temp.path(), "p/Plain", ClassFileBuilder::new("p/Plain").build());

    javah()
        .arg("-cp")
        .arg(temp.path())
        .arg("-d")
        .arg(temp.path())
        .arg("p.Plain")
        .assert()
        .success();
    assert!(!temp.path().join("p_Plain.h").exists());

    javah()
        .arg("-cp")
        .arg(temp.path())
        .arg("-d")
        .arg(temp.path())
        .arg("--emit-empty")
        .arg("p.Plain")
        .assert()
        .success();
    let text = fs::read_to_string(temp.path().join("p_Plain.h")).unwrap();
    assert!(!text.contains("JNIEXPORT"));
}
