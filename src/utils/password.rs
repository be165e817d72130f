use crate::config::{AppConfig, Argon2Config};
use crate::errors::FileDeskError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

fn argon2_with(config: &Argon2Config) -> Result<Argon2<'static>, FileDeskError> {
    let params = Params::new(
        config.memory_cost,
        config.time_cost,
        config.parallelism,
        None,
    )
    .map_err(|e| FileDeskError::validation(format!("Argon2 参数错误: {e}")))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// 按配置的 Argon2id 参数哈希密码
pub fn hash_password(password: &str) -> Result<String, FileDeskError> {
    let argon2 = argon2_with(&AppConfig::get().argon2)?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| FileDeskError::validation(format!("密码哈希失败: {e}")))?;
    Ok(hash.to_string())
}

/// 参数从 PHC 字符串中读取，配置变更后旧哈希仍可验证
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Secret123", &hash));
        assert!(!verify_password("secret123", &hash));
        assert!(!verify_password("Secret123", "not-a-hash"));
    }
}
