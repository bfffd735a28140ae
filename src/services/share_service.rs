//! Shareable match messages and their WhatsApp deep links.

use std::fmt::Write;

use uuid::Uuid;

use crate::{
    dao::models::{MatchEntity, UserEntity},
    dto::share::{ShareKind, ShareResponse},
    error::ServiceError,
    services::match_service,
    state::{SharedState, roster::MATCH_CAPACITY, schedule::parse_date},
};

const WHATSAPP_SEND_URL: &str = "https://api.whatsapp.com/send?text=";

pub async fn share_match(
    state: &SharedState,
    id: Uuid,
    kind: ShareKind,
) -> Result<ShareResponse, ServiceError> {
    let entity = match_service::load_match(state, id).await?;
    let message = compose_message(&entity, kind, &state.config().club_name);
    Ok(ShareResponse {
        kind,
        whatsapp_url: whatsapp_url(&message),
        message,
    })
}

pub fn whatsapp_url(message: &str) -> String {
    format!("{WHATSAPP_SEND_URL}{}", urlencoding::encode(message))
}

pub fn compose_message(entity: &MatchEntity, kind: ShareKind, club_name: &str) -> String {
    let date = long_date(&entity.date);
    match kind {
        ShareKind::Created => format!(
            "New padel match at {club_name}! 🎾\n\n🗓️ *Date:* {date}\n⏰ *Time:* {}\n📍 *Court:* {}\n\nOpen the app and sign up!",
            entity.time, entity.court
        ),
        ShareKind::Status => {
            let mut message = format!(
                "🎾 *{club_name}*\n\n🗓️ *{date}*\n⏰ *{} hrs*\n📍 *{}*\n\n👥 *Line-up:*",
                entity.time, entity.court
            );
            for (index, player) in entity.players.iter().enumerate() {
                let _ = write!(message, "\n{}. {}", index + 1, first_name(player));
            }
            for slot in entity.players.len()..MATCH_CAPACITY {
                let _ = write!(message, "\n{}. 🟢 Free", slot + 1);
            }
            if !entity.waiting_list.is_empty() {
                message.push_str("\n\n⏳ *Waiting list:*");
                for (index, user) in entity.waiting_list.iter().enumerate() {
                    let _ = write!(message, "\n{}. {}", index + 1, first_name(user));
                }
            }
            message.push_str("\n\n📲 See you on court!");
            message
        }
    }
}

/// `Saturday, 24 October`, or the raw value when it does not parse.
fn long_date(raw: &str) -> String {
    match parse_date(raw) {
        Ok(date) => format!("{}, {} {}", date.weekday(), date.day(), date.month()),
        Err(_) => raw.to_string(),
    }
}

fn first_name(user: &UserEntity) -> &str {
    user.name.split_whitespace().next().unwrap_or(&user.name)
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn user(id: &str, name: &str) -> UserEntity {
        UserEntity {
            id: id.into(),
            name: name.into(),
            avatar: String::new(),
            email: None,
            phone: None,
            dob: None,
        }
    }

    fn sample() -> MatchEntity {
        let now = SystemTime::now();
        MatchEntity {
            id: Uuid::new_v4(),
            date: "2026-10-24".into(),
            time: "18:30".into(),
            court: "Club Central".into(),
            address: None,
            starts_at: now,
            players: vec![user("1", "Ana García"), user("2", "Luis")],
            waiting_list: Vec::new(),
            created_by: user("1", "Ana García"),
            teams: None,
            score: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn announcement_names_date_time_and_court() {
        let message = compose_message(&sample(), ShareKind::Created, "Pirañas");
        assert!(message.starts_with("New padel match at Pirañas!"));
        assert!(message.contains("*Date:* Saturday, 24 October"));
        assert!(message.contains("*Time:* 18:30"));
        assert!(message.contains("*Court:* Club Central"));
    }

    #[test]
    fn status_lists_first_names_and_free_slots() {
        let message = compose_message(&sample(), ShareKind::Status, "Pirañas");
        assert!(message.contains("1. Ana\n2. Luis\n3. 🟢 Free\n4. 🟢 Free"));
        assert!(!message.contains("Waiting list"));
    }

    #[test]
    fn status_appends_waiting_list_when_present() {
        let mut entity = sample();
        entity
            .players
            .extend([user("3", "Marta"), user("4", "Pablo")]);
        entity.waiting_list.push(user("5", "Iker Ruiz"));

        let message = compose_message(&entity, ShareKind::Status, "Pirañas");
        assert!(!message.contains("Free"));
        assert!(message.contains("⏳ *Waiting list:*\n1. Iker"));
    }

    #[test]
    fn deep_link_percent_encodes_the_message() {
        let url = whatsapp_url("Hi there\n*bold*");
        assert_eq!(
            url,
            "https://api.whatsapp.com/send?text=Hi%20there%0A%2Abold%2A"
        );
    }
}
