use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{5,16}$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

/// 工作区、文件夹、文件名称的最大字符数
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_NOTE_LEN: usize = 2000;

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "abcd1234",
    "letmein1",
    "welcome1",
];

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username must be 5-16 characters of letters, numbers, underscores or hyphens",
        );
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码策略：至少 8 位，包含大小写字母和数字，且不在常见弱密码表中。
/// 返回全部未满足的规则。
pub fn password_policy_violations(password: &str) -> Vec<&'static str> {
    let rules: [(bool, &'static str); 5] = [
        (
            password.chars().count() >= 8,
            "Password must be at least 8 characters long",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "Password must contain at least one uppercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "Password must contain at least one lowercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "Password must contain at least one digit",
        ),
        (
            !COMMON_PASSWORDS
                .iter()
                .any(|weak| password.eq_ignore_ascii_case(weak)),
            "Password is too common, please choose a stronger password",
        ),
    ];

    rules
        .into_iter()
        .filter_map(|(ok, message)| (!ok).then_some(message))
        .collect()
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let violations = password_policy_violations(password);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations.join("; "))
    }
}

/// 校验并返回去除首尾空白后的名称
///
/// 名称会出现在下载文件名和路径展示里，因此拒绝路径分隔符、控制字符和 `.`/`..`。
pub fn validate_name(name: &str) -> Result<String, &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name must not be empty");
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err("Name must be at most 255 characters");
    }
    if name == "." || name == ".." {
        return Err("Name must not be '.' or '..'");
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err("Name must not contain slashes or control characters");
    }
    Ok(name.to_string())
}

/// 可选的备注/描述：空白视为未填写
pub fn normalize_note(note: Option<String>) -> Result<Option<String>, &'static str> {
    match note.map(|n| n.trim().to_string()) {
        Some(n) if n.is_empty() => Ok(None),
        Some(n) if n.chars().count() > MAX_NOTE_LEN => Err("Text must be at most 2000 characters"),
        other => Ok(other),
    }
}

/// 更新时的描述：None 表示不修改，空白表示清空（返回空串）
pub fn normalize_note_update(note: Option<String>) -> Result<Option<String>, &'static str> {
    match note {
        None => Ok(None),
        Some(n) => Ok(Some(normalize_note(Some(n))?.unwrap_or_default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("this-name-is-way-too-long").is_err());
        assert!(validate_username("bad name").is_err());
    }

    #[test]
    fn test_password_policy_collects_all_violations() {
        assert!(validate_password("SecurePass123").is_ok());

        let violations = password_policy_violations("abc");
        assert!(violations.contains(&"Password must be at least 8 characters long"));
        assert!(violations.contains(&"Password must contain at least one uppercase letter"));
        assert!(violations.contains(&"Password must contain at least one digit"));
        assert!(!violations.contains(&"Password must contain at least one lowercase letter"));

        assert_eq!(
            password_policy_violations("Password1"),
            vec!["Password is too common, please choose a stronger password"]
        );
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Q3 report.pdf ").unwrap(), "Q3 report.pdf");
        assert!(validate_name("   ").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("line\nbreak").is_err());
        assert!(validate_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_normalize_note() {
        assert_eq!(normalize_note(Some("  ".into())).unwrap(), None);
        assert_eq!(
            normalize_note(Some(" ok ".into())).unwrap(),
            Some("ok".to_string())
        );
        assert!(normalize_note(Some("x".repeat(2001))).is_err());
    }

    #[test]
    fn test_normalize_note_update_distinguishes_clear() {
        assert_eq!(normalize_note_update(None).unwrap(), None);
        assert_eq!(normalize_note_update(Some(" ".into())).unwrap(), Some(String::new()));
        assert_eq!(
            normalize_note_update(Some(" new ".into())).unwrap(),
            Some("new".to_string())
        );
    }
}
