//! 上传内容的文件头校验

/// 根据扩展名推断的内容类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Png,
    Jpeg,
    Gif,
    Webp,
    Pdf,
    /// OLE 复合文档（旧版 Office）
    Ole,
    /// ZIP 容器（zip 与 OOXML）
    Zip,
    Text,
}

fn family_of(extension: &str) -> Option<Family> {
    let family = match extension.to_ascii_lowercase().as_str() {
        ".png" => Family::Png,
        ".jpg" | ".jpeg" => Family::Jpeg,
        ".gif" => Family::Gif,
        ".webp" => Family::Webp,
        ".pdf" => Family::Pdf,
        ".doc" | ".xls" | ".ppt" => Family::Ole,
        ".zip" | ".docx" | ".xlsx" | ".pptx" => Family::Zip,
        ".txt" | ".md" | ".csv" | ".json" => Family::Text,
        _ => return None,
    };
    Some(family)
}

const OLE_HEADER: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_HEADER: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
// 空 zip 只有中央目录结束记录
const EMPTY_ZIP_HEADER: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

/// 文本类文件：不含 NUL，且头部是合法 UTF-8（允许末尾被截断的多字节字符）
fn looks_like_text(head: &[u8]) -> bool {
    if head.contains(&0) {
        return false;
    }
    match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

/// 校验文件头是否与扩展名一致，`head` 为文件开头的若干字节。
/// 未知扩展名一律拒绝。
pub fn validate_magic_bytes(head: &[u8], extension: &str) -> bool {
    if head.is_empty() {
        return false;
    }

    let Some(family) = family_of(extension) else {
        return false;
    };

    match family {
        Family::Png => head.starts_with(b"\x89PNG\r\n\x1a\n"),
        Family::Jpeg => head.starts_with(&[0xFF, 0xD8, 0xFF]),
        Family::Gif => head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a"),
        Family::Webp => head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"WEBP",
        Family::Pdf => head.starts_with(b"%PDF-"),
        Family::Ole => head.starts_with(&OLE_HEADER),
        Family::Zip => head.starts_with(&ZIP_HEADER) || head.starts_with(&EMPTY_ZIP_HEADER),
        Family::Text => looks_like_text(head),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_formats() {
        assert!(validate_magic_bytes(b"\x89PNG\r\n\x1a\n....", ".PNG"));
        assert!(!validate_magic_bytes(b"\x89PNG\r\n\x1a\n....", ".jpg"));
        assert!(validate_magic_bytes(b"%PDF-1.7\n", ".pdf"));
        assert!(validate_magic_bytes(&[0x50, 0x4B, 0x03, 0x04, 0x14], ".docx"));
        assert!(!validate_magic_bytes(&[0x50, 0x4B, 0x03, 0x04, 0x14], ".doc"));
        assert!(validate_magic_bytes(b"RIFF\x00\x00\x00\x00WEBPVP8 ", ".webp"));
    }

    #[test]
    fn test_text_formats() {
        assert!(validate_magic_bytes(b"name,amount\nfoo,1\n", ".csv"));
        assert!(validate_magic_bytes("标题\n".as_bytes(), ".md"));
        // 截断在多字节字符中间
        assert!(validate_magic_bytes(&"日本".as_bytes()[..4], ".txt"));
        assert!(!validate_magic_bytes(b"MZ\x90\x00\x03", ".txt"));
        assert!(!validate_magic_bytes(&[0xFF, 0xFE, 0xFD], ".json"));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(!validate_magic_bytes(&[], ".txt"));
        assert!(!validate_magic_bytes(b"MZ", ".exe"));
    }
}
