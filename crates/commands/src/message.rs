//! Display strings for command outcomes.

use annostack_core::CommandKind;

pub const NOTHING_TO_UNDO: &str = "There are no more commands to undo";
pub const NOTHING_TO_REDO: &str = "There are no more commands to redo";

/// Namespace prefixed to callback method names.
pub const METHOD_NAMESPACE: &str = "annostack";

/// Human-readable message for a change, e.g. `Term 0190… (Tumor) added`.
pub fn action_message(kind: CommandKind, label: &str, params: &[String]) -> String {
    match params.split_first() {
        None => format!("{label} {}", kind.verb()),
        Some((first, [])) => format!("{label} {first} {}", kind.verb()),
        Some((first, rest)) => format!("{label} {first} ({}) {}", rest.join(", "), kind.verb()),
    }
}

/// Callback method name clients key optimistic updates on, e.g. `annostack.AddTermCommand`.
pub fn callback_method(kind: CommandKind, label: &str) -> String {
    format!("{METHOD_NAMESPACE}.{}{label}Command", kind.method_prefix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_message_formats_params() {
        assert_eq!(action_message(CommandKind::Delete, "Term", &[]), "Term deleted");
        assert_eq!(
            action_message(CommandKind::Add, "Term", &["t1".into()]),
            "Term t1 added"
        );
        assert_eq!(
            action_message(CommandKind::Edit, "Term", &["t1".into(), "Tumor".into(), "o1".into()]),
            "Term t1 (Tumor, o1) edited"
        );
    }

    #[test]
    fn callback_method_uses_namespace() {
        assert_eq!(callback_method(CommandKind::Add, "Term"), "annostack.AddTermCommand");
        assert_eq!(
            callback_method(CommandKind::Delete, "AnnotationTerm"),
            "annostack.DeleteAnnotationTermCommand"
        );
    }
}
