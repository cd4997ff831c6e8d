//! Picks the native methods of a class and groups overloads.

use fnv::FnvHashMap;

use crate::model::{ClassInfo, MethodInfo};

/// A native method together with its position in the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeMethod<'a> {
    pub method: &'a MethodInfo,
    /// Index into [`ClassInfo::methods`].
    pub declaration_index: usize,
}

/// All native methods of one class sharing a name.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeMethodGroup<'a> {
    pub declaring_class: &'a ClassInfo,
    pub name: &'a str,
    /// Never empty, in declaration order.
    pub overloads: Vec<NativeMethod<'a>>,
}

impl NativeMethodGroup<'_> {
    /// Whether the overloads need an argument-signature suffix.
    pub fn is_overloaded(&self) -> bool {
        self.overloads.len() > 1
    }
}

/// Groups the native methods of `class` by name.
///
/// Groups appear in the order their first member is declared. Non-native
/// methods never join a group, so a native sharing its name only with
/// ordinary methods stays unsuffixed.
pub fn select_native_methods(class: &ClassInfo) -> Vec<NativeMethodGroup<'_>> {
    let mut groups: Vec<NativeMethodGroup<'_>> = Vec::new();
    let mut by_name: FnvHashMap<&str, usize> = FnvHashMap::default();

    for (declaration_index, method) in class.methods.iter().enumerate() {
        if !method.is_native {
            continue;
        }
        let native = NativeMethod {
            method,
            declaration_index,
        };
        match by_name.get(method.name.as_str()) {
            Some(&group) => groups[group].overloads.push(native),
            None => {
                by_name.insert(&method.name, groups.len());
                groups.push(NativeMethodGroup {
                    declaring_class: class,
                    name: &method.name,
                    overloads: vec![native],
                });
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::select_native_methods;
    use crate::model::{ClassInfo, MethodInfo};

    #[test]
    fn no_natives_is_empty() {
        let class = ClassInfo::new("a/B").with_method(MethodInfo::new("f", "()V"));
        assert!(select_native_methods(&class).is_empty());
    }

    #[test]
    fn groups_in_first_seen_order() {
        let class = ClassInfo::new("p/Q")
            .with_method(MethodInfo::new("g", "()V").native())
            .with_method(MethodInfo::new("f", "(I)V").native())
            .with_method(MethodInfo::new("h", "()V"))
            .with_method(MethodInfo::new("g", "(J)V").native());
        let groups = select_native_methods(&class);

        let names: Vec<_> = groups.iter().map(|g| g.name).collect();
        assert_eq!(names, ["g", "f"]);
        assert!(groups[0].is_overloaded());
        assert!(!groups[1].is_overloaded());
        let indices: Vec<_> = groups[0].overloads.iter().map(|n| n.declaration_index).collect();
        assert_eq!(indices, [0, 3]);
        assert_eq!(groups[0].overloads[1].method.descriptor, "(J)V");
    }

    #[test]
    fn ordinary_namesakes_do_not_overload() {
        let class = ClassInfo::new("p/Q")
            .with_method(MethodInfo::new("f", "(I)V"))
            .with_method(MethodInfo::new("f", "(J)V").native());
        let groups = select_native_methods(&class);
        assert_eq!(groups.len(), 1);
        assert!(!groups[0].is_overloaded());
    }
}
