/// Logical type name for a record type's name.
///
/// Splits camel case into lowercase, underscore-separated words. Module
/// paths and generic arguments (as produced by `std::any::type_name`) are
/// dropped first. An acronym stays one word until the capital that starts
/// the next word, and a digit followed by a capital ends a word.
///
/// ```
/// use registry_sync::registry::type_name_from_class;
///
/// assert_eq!(type_name_from_class("FirmRecord"), "firm_record");
/// assert_eq!(type_name_from_class("HTTPClient"), "http_client");
/// assert_eq!(type_name_from_class("app::records::PaymentProfile"), "payment_profile");
/// ```
pub fn type_name_from_class(class_name: &str) -> String {
    let base = class_name.split('<').next().unwrap_or_default();
    let base = base.rsplit("::").next().unwrap_or_default().trim();

    let chars: Vec<char> = base.chars().collect();
    let mut name = String::with_capacity(base.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            push_separator(&mut name);
            continue;
        }

        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                push_separator(&mut name);
            }
        }
        name.extend(c.to_lowercase());
    }

    name.trim_matches('_').to_string()
}

fn push_separator(name: &mut String) {
    if !name.is_empty() && !name.ends_with('_') {
        name.push('_');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_camel_case() {
        assert_eq!(type_name_from_class("FirmRecord"), "firm_record");
        assert_eq!(type_name_from_class("Person"), "person");
        assert_eq!(type_name_from_class("paymentProfile"), "payment_profile");
    }

    #[test]
    fn keeps_acronyms_together() {
        assert_eq!(type_name_from_class("HTTPClient"), "http_client");
        assert_eq!(type_name_from_class("XMLHttpRequest"), "xml_http_request");
        assert_eq!(type_name_from_class("CPDRecord"), "cpd_record");
        assert_eq!(type_name_from_class("ID"), "id");
    }

    #[test]
    fn digits_end_words_before_capitals() {
        assert_eq!(type_name_from_class("Address2Line"), "address2_line");
        assert_eq!(type_name_from_class("Level3"), "level3");
    }

    #[test]
    fn strips_paths_generics_and_separators() {
        assert_eq!(type_name_from_class("my_app::records::FirmRecord"), "firm_record");
        assert_eq!(type_name_from_class("Wrapper<my_app::Firm>"), "wrapper");
        assert_eq!(type_name_from_class("already_snake"), "already_snake");
        assert_eq!(type_name_from_class("Firm__Record"), "firm_record");
        assert_eq!(type_name_from_class(""), "");
    }

    #[test]
    fn is_idempotent() {
        for name in ["FirmRecord", "HTTPClient", "Address2Line"] {
            let once = type_name_from_class(name);
            assert_eq!(type_name_from_class(&once), once);
        }
    }
}
