//! Name and role labels shown in the side menu.

/// Label used when there is no signed-in user or no role
pub const GUEST_LABEL: &str = "Invitado";

/// Capitalize each word, splitting on whitespace, '.', '_' and '-'
pub fn title_case(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || matches!(c, '.' | '_' | '-'))
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Menu label for a profile role. Known roles (English or Spanish) map to a
/// fixed label; anything else is title-cased; no role is a guest.
pub fn role_label(role: Option<&str>) -> String {
    let role = role.unwrap_or_default().trim().to_lowercase();
    match role.as_str() {
        "" => GUEST_LABEL.to_string(),
        "student" | "estudiante" => "Estudiante".to_string(),
        "teacher" | "docente" | "profesor" => "Docente".to_string(),
        "admin" | "administrator" | "administrador" => "Administrador".to_string(),
        other => title_case(other),
    }
}

/// Name shown in the menu header: the account's display name, or the local
/// part of its email, or the guest label, title-cased.
pub fn display_name_for(display_name: Option<&str>, email: Option<&str>) -> String {
    let raw = match (display_name.filter(|n| !n.is_empty()), email) {
        (Some(name), _) => name,
        (None, Some(email)) => email.split('@').next().unwrap_or_default(),
        (None, None) => GUEST_LABEL,
    };
    title_case(raw)
}
