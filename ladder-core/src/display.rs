use ladder_types::{User, UserSummary};

pub const GHOST_PREFIX: &str = "ghost_";

pub fn is_ghost(user: &User) -> bool {
    user.is_ghost || user.username.starts_with(GHOST_PREFIX)
}

/// `jane@example.com` becomes `j***@example.com`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

/// Name shown for a user. Placeholder accounts never expose their address.
pub fn smart_display_name(user: &User) -> String {
    if is_ghost(user) {
        if let Some(email) = user.email.as_deref().filter(|e| !e.is_empty()) {
            return mask_email(email);
        }
        if user.name.as_deref().is_none_or(str::is_empty) {
            return "Pending Invite".to_string();
        }
    }
    user.username.clone()
}

pub fn summarize(user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        username: user.username.clone(),
        display_name: smart_display_name(user),
        avatar_url: user
            .profile_picture_thumbnail_url
            .clone()
            .or_else(|| user.profile_picture_url.clone()),
        dupr_rating: user.dupr_rating,
        is_ghost: is_ghost(user),
    }
}

/// Default name for a doubles pairing.
pub fn team_name(a: &User, b: &User) -> String {
    let label = |u: &User| u.name.clone().unwrap_or_else(|| u.username.clone());
    format!("{} & {}", label(a), label(b))
}
