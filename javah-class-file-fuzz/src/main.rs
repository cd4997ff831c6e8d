use afl::fuzz;
use javah::{analyze_class_file, GeneratorConfig};
use javah_class_file::ClassFile;

fn main() {
    let config = GeneratorConfig {
        emit_for_classes_with_no_natives: true,
        ..GeneratorConfig::default()
    };
    fuzz!(|data: &[u8]| {
        if let Ok(class_file) = ClassFile::from_bytes(data) {
            if let Ok(Some(unit)) = analyze_class_file(&class_file, &config) {
                let _ = unit.render();
            }
        }
    });
}
