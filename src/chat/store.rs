use crate::{identity::Identity, model::{Message, User}};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserSlot {
    Unknown,
    Resolved(User),
    Unresolved,
}

/// Message collection of one mounted page, plus who is looking at it.
#[derive(Debug)]
pub struct SyncStore {
    user: UserSlot,
    messages: Vec<Message>,
}

impl SyncStore {
    pub fn new(initial: Vec<Message>) -> Self {
        Self {
            user: UserSlot::Unknown,
            messages: initial,
        }
    }

    pub fn user_slot(&self) -> &UserSlot {
        &self.user
    }

    pub fn user(&self) -> Option<&User> {
        match &self.user {
            UserSlot::Resolved(user) => Some(user),
            _ => None,
        }
    }

    /// Settles the user slot. Only the first call has any effect; the user is
    /// returned when it resolved, meaning the collection should be refetched.
    pub fn resolve(&mut self, identity: Identity) -> Option<User> {
        if self.user != UserSlot::Unknown {
            return None;
        }
        match identity {
            Identity::Resolved(user) => {
                self.user = UserSlot::Resolved(user.clone());
                Some(user)
            }
            Identity::Unresolved => {
                self.user = UserSlot::Unresolved;
                None
            }
        }
    }

    /// Appends a pushed message. No de-duplication.
    pub fn push_arrival(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Overwrites the collection with a refetched one. Anything pushed before
    /// this point is gone.
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The collection in display order: `createdAt` descending.
    pub fn ordered(&self) -> Vec<Message> {
        let mut ordered = self.messages.clone();
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, owner: &str, created_at: &str) -> Message {
        Message {
            id: id.to_owned(),
            owner: owner.to_owned(),
            message: format!("from {owner}"),
            created_at: created_at.to_owned(),
        }
    }

    #[test]
    fn ordering_is_newest_first() {
        let store = SyncStore::new(vec![
            msg("1", "alice", "2024-01-01"),
            msg("2", "bob", "2024-01-02"),
        ]);
        let ids: Vec<_> = store.ordered().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, ["2", "1"]);
    }

    #[test]
    fn ordering_keeps_ties_in_insertion_order() {
        let store = SyncStore::new(vec![
            msg("a", "alice", "2024-01-01T00:00:00Z"),
            msg("b", "bob", "2024-01-01T00:00:00Z"),
            msg("c", "carol", "2024-01-03T00:00:00Z"),
        ]);
        let ids: Vec<_> = store.ordered().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn resolution_fires_once() {
        let mut store = SyncStore::new(Vec::new());
        assert_eq!(store.resolve(Identity::Resolved(User::new("alice"))), Some(User::new("alice")));
        assert_eq!(store.resolve(Identity::Resolved(User::new("bob"))), None);
        assert_eq!(store.resolve(Identity::Unresolved), None);
        assert_eq!(store.user(), Some(&User::new("alice")));
    }

    #[test]
    fn unresolved_requests_no_refetch() {
        let mut store = SyncStore::new(Vec::new());
        assert_eq!(store.resolve(Identity::Unresolved), None);
        assert_eq!(store.user_slot(), &UserSlot::Unresolved);
        assert_eq!(store.user(), None);
    }

    #[test]
    fn arrivals_append_without_dedup() {
        let mut store = SyncStore::new(vec![msg("1", "alice", "2024-01-01")]);
        store.push_arrival(msg("1", "alice", "2024-01-01"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn arrival_survives_resolution_until_refetch_overwrites() {
        let mut store = SyncStore::new(Vec::new());
        store.push_arrival(msg("9", "bob", "2024-01-01T00:00:09Z"));
        store.resolve(Identity::Resolved(User::new("alice")));
        assert_eq!(store.len(), 1);

        store.replace_all(vec![msg("1", "alice", "2024-01-01T00:00:00Z")]);
        let ids: Vec<_> = store.ordered().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, ["1"]);
    }
}
