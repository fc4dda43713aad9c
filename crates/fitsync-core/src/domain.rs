use serde::{Deserialize, Serialize};

/// One named slice of application state, captured independently in a snapshot.
///
/// Serde names match the snapshot payload fields; `store_key` maps each
/// domain to the key its serialized state lives under in the local store.
/// Adding a domain means extending this enum and `ALL`; the compiler
/// catches every other site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "currentUser")]
    CurrentUser,
    #[serde(rename = "users")]
    Users,
    #[serde(rename = "posts")]
    Posts,
    #[serde(rename = "challenges")]
    Challenges,
    #[serde(rename = "dailyGoals")]
    DailyGoals,
    #[serde(rename = "challengeParticipants")]
    ChallengeParticipants,
    #[serde(rename = "events")]
    Events,
    #[serde(rename = "eventParticipants")]
    EventParticipants,
    #[serde(rename = "products")]
    Products,
    #[serde(rename = "orders")]
    Orders,
    #[serde(rename = "groups")]
    Groups,
    #[serde(rename = "groupMembers")]
    GroupMembers,
}

impl Domain {
    pub const ALL: [Domain; 12] = [
        Domain::CurrentUser,
        Domain::Users,
        Domain::Posts,
        Domain::Challenges,
        Domain::DailyGoals,
        Domain::ChallengeParticipants,
        Domain::Events,
        Domain::EventParticipants,
        Domain::Products,
        Domain::Orders,
        Domain::Groups,
        Domain::GroupMembers,
    ];

    /// Local store key holding this domain's serialized state.
    pub fn store_key(self) -> &'static str {
        match self {
            Domain::CurrentUser => "current-user",
            Domain::Users => "user-list",
            Domain::Posts => "posts",
            Domain::Challenges => "challenges",
            Domain::DailyGoals => "daily-goals",
            Domain::ChallengeParticipants => "challenge-participants",
            Domain::Events => "events",
            Domain::EventParticipants => "event-participants",
            Domain::Products => "products",
            Domain::Orders => "orders",
            Domain::Groups => "groups",
            Domain::GroupMembers => "group-members",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_keys_are_unique() {
        let mut keys: Vec<&str> = Domain::ALL.iter().map(|d| d.store_key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Domain::ALL.len());
    }

    #[test]
    fn serde_names_round_trip() {
        for domain in Domain::ALL {
            let json = serde_json::to_string(&domain).unwrap();
            let back: Domain = serde_json::from_str(&json).unwrap();
            assert_eq!(back, domain);
        }
    }

    #[test]
    fn user_list_key_differs_from_serde_name() {
        // The payload field is "users" but the store key is "user-list".
        assert_eq!(serde_json::to_string(&Domain::Users).unwrap(), "\"users\"");
        assert_eq!(Domain::Users.store_key(), "user-list");
    }
}
