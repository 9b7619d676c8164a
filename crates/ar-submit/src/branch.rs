//! Deterministic branch naming
//!
//! A task's branch depends only on its key and id, so a retry of the same
//! task lands on the same branch and unrelated tasks never collide.

/// Longest sanitized task key kept in a branch name.
const MAX_KEY_LEN: usize = 50;

/// Number of task-id characters appended to the branch name.
const ID_PREFIX_LEN: usize = 8;

/// Derive `<prefix><sanitized-key>-<first 8 chars of id>`.
pub fn branch_name(prefix: &str, task_key: &str, task_id: &str) -> String {
    let mut key = sanitize(task_key);
    if key.len() > MAX_KEY_LEN {
        key.truncate(MAX_KEY_LEN);
        key = key.trim_end_matches('-').to_string();
    }
    if key.is_empty() {
        key = "task".to_string();
    }

    let id: String = sanitize(task_id).chars().take(ID_PREFIX_LEN).collect();
    if id.is_empty() {
        format!("{}{}", prefix, key)
    } else {
        format!("{}{}-{}", prefix, key, id)
    }
}

/// Lower-case, keep `[a-z0-9_-]`, collapse everything else into single hyphens.
fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combines_prefix_key_and_id_prefix() {
        assert_eq!(
            branch_name("agent/", "fix-login", "3f2a9c1e-77aa-4b0e-9d1c-000000000000"),
            "agent/fix-login-3f2a9c1e"
        );
    }

    #[test]
    fn sanitizes_key_into_identifier_safe_form() {
        assert_eq!(
            branch_name("agent/", "Add Stripe  Webhook!!", "abc"),
            "agent/add-stripe-webhook-abc"
        );
        assert_eq!(branch_name("agent/", "feat/../x", "1"), "agent/feat-x-1");
    }

    #[test]
    fn is_stable_across_calls() {
        let a = branch_name("agent/", "sync_workflows", "deadbeefcafe");
        let b = branch_name("agent/", "sync_workflows", "deadbeefcafe");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_ids_give_distinct_branches() {
        assert_ne!(
            branch_name("agent/", "same-key", "11111111-x"),
            branch_name("agent/", "same-key", "22222222-x")
        );
    }

    #[test]
    fn empty_key_falls_back_to_task() {
        assert_eq!(branch_name("agent/", "!!!", "12345678"), "agent/task-12345678");
    }

    #[test]
    fn long_keys_are_truncated() {
        let key = "a".repeat(80);
        let name = branch_name("", &key, "id");
        assert_eq!(name, format!("{}-id", "a".repeat(50)));
    }
}
