/// 由名称生成 slug：字母数字转小写保留，其余字符连续出现时折叠为一个 `-`，首尾不留 `-`。
///
/// 非 ASCII 字母（如中文）按原样保留，仅做小写转换。
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// 标题格式：每个单词首字母大写、其余小写，单词之间保留单个空格
pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Power Tools"), "power-tools");
        assert_eq!(slugify("  --Hand & Garden--  "), "hand-garden");
        assert_eq!(slugify("USB-C"), "usb-c");
        assert_eq!(slugify("五金 工具"), "五金-工具");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn title_case_normalizes_words() {
        assert_eq!(title_case("power   TOOLS"), "Power Tools");
        assert_eq!(title_case("usb-c cables"), "Usb-c Cables");
        assert_eq!(title_case("五金"), "五金");
    }
}
