use rand::Rng;

const PASSWORD_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";

/// 生成管理员初始密码（12位，保证含大小写字母与数字）
pub fn generate_initial_password() -> String {
    let mut rng = rand::thread_rng();
    loop {
        let password: String = (0..12)
            .map(|_| {
                let idx = rng.gen_range(0..PASSWORD_CHARS.len());
                PASSWORD_CHARS[idx] as char
            })
            .collect();

        let has_lowercase = password.chars().any(|c| c.is_lowercase());
        let has_uppercase = password.chars().any(|c| c.is_uppercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if has_lowercase && has_uppercase && has_digit {
            return password;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::password::validate_password;

    #[test]
    fn test_generate_initial_password() {
        let password = generate_initial_password();
        assert_eq!(password.len(), 12);
        assert!(validate_password(&password).is_ok());
    }

    #[test]
    fn test_generated_passwords_use_allowed_chars() {
        let password = generate_initial_password();
        assert!(
            password
                .bytes()
                .all(|b| PASSWORD_CHARS.contains(&b))
        );
    }
}
