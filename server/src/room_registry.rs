use std::{collections::HashMap, net::SocketAddr};

use log::info;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::room::{LoggedMessage, Member, Room, RoomId, RoomInfo};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("designated room does not exist")]
    RoomNotFound,

    #[error("member is not part of the room")]
    MemberNotFound,

    #[error("wrong room password")]
    WrongPassword,
}

/// Outcome of a member leaving a room.
#[derive(Debug)]
pub struct Departure {
    pub member_name: String,
    /// The host left, so the room and every remaining member are gone.
    pub room_closed: bool,
    /// Known addresses of the members that were still in the room.
    pub notify: Vec<SocketAddr>,
}

/// Sole owner of every room and member. Each operation takes the one lock,
/// works on memory, and releases it before returning.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_room(
        &self,
        name: &str,
        password: &str,
        creator_name: &str,
    ) -> (RoomInfo, Member) {
        let mut room = Room::new(name, password);
        let host = Member::host(creator_name);

        room.members.insert(host.id().clone(), host.clone());
        let room_info = room.info();

        self.rooms.lock().await.insert(room.id.clone(), room);

        info!(
            "Room '{}' ({}) created by {}",
            room_info.name,
            room_info.id,
            host.name()
        );

        (room_info, host)
    }

    pub async fn find_room(&self, room_id: &str) -> Result<RoomInfo, RegistryError> {
        self.rooms
            .lock()
            .await
            .get(room_id)
            .map(Room::info)
            .ok_or(RegistryError::RoomNotFound)
    }

    pub async fn join_room(
        &self,
        room_id: &str,
        member_name: &str,
        supplied_password: &str,
    ) -> Result<(RoomInfo, Member), RegistryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or(RegistryError::RoomNotFound)?;

        if !room.admits(supplied_password) {
            return Err(RegistryError::WrongPassword);
        }

        let member = Member::guest(member_name);
        room.members.insert(member.id().clone(), member.clone());

        let current: Vec<&str> = room.members.values().map(Member::name).collect();
        info!(
            "{} joined '{}'; current members: {}",
            member.name(),
            room.name,
            current.join(", ")
        );

        Ok((room.info(), member))
    }

    /// Records where a member can be reached. Later calls replace the address.
    pub async fn learn_address(
        &self,
        room_id: &str,
        member_id: &str,
        address: SocketAddr,
    ) -> Result<(), RegistryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or(RegistryError::RoomNotFound)?;
        let member = room
            .members
            .get_mut(member_id)
            .ok_or(RegistryError::MemberNotFound)?;

        member.set_address(address);

        Ok(())
    }

    pub async fn record_message(
        &self,
        room_id: &str,
        member_id: &str,
        content: &str,
    ) -> Result<(), RegistryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or(RegistryError::RoomNotFound)?;
        let member = room
            .members
            .get(member_id)
            .ok_or(RegistryError::MemberNotFound)?;

        let entry = LoggedMessage {
            member_id: member.id().clone(),
            content: content.to_string(),
        };
        room.messages.push(entry);

        Ok(())
    }

    /// Removing the host removes the whole room.
    pub async fn remove_member(
        &self,
        room_id: &str,
        member_id: &str,
    ) -> Result<Departure, RegistryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or(RegistryError::RoomNotFound)?;
        let member = room
            .members
            .remove(member_id)
            .ok_or(RegistryError::MemberNotFound)?;

        let notify = room.members.values().filter_map(Member::address).collect();
        let room_name = room.name.clone();
        let room_closed = member.is_host();

        if room_closed {
            rooms.remove(room_id);
            info!("Room '{}' ({}) closed by its host", room_name, room_id);
        } else {
            info!("{} left room '{}' ({})", member.name(), room_name, room_id);
        }

        Ok(Departure {
            member_name: member.name().to_string(),
            room_closed,
            notify,
        })
    }

    pub async fn list_members(&self, room_id: &str) -> Result<Vec<Member>, RegistryError> {
        self.rooms
            .lock()
            .await
            .get(room_id)
            .map(|room| room.members.values().cloned().collect())
            .ok_or(RegistryError::RoomNotFound)
    }

    #[cfg(test)]
    pub(crate) async fn message_count(&self, room_id: &str) -> Result<usize, RegistryError> {
        self.rooms
            .lock()
            .await
            .get(room_id)
            .map(|room| room.messages.len())
            .ok_or(RegistryError::RoomNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[tokio::test]
    async fn created_room_holds_only_its_host() {
        let registry = RoomRegistry::new();
        let (room, host) = registry.create_room("General", "", "alice").await;

        assert!(host.is_host());
        assert_eq!(host.address(), None);
        assert_eq!(room.member_count, 1);
        assert!(!room.has_password());

        let found = registry.find_room(room.id.as_str()).await.unwrap();
        assert_eq!(found, room);
    }

    #[tokio::test]
    async fn rooms_get_distinct_ids() {
        let registry = RoomRegistry::new();
        let (first, _) = registry.create_room("General", "", "alice").await;
        let (second, _) = registry.create_room("General", "", "alice").await;

        assert_ne!(first.id, second.id);
        assert_eq!(first.id.as_str().len(), roomchat_shared::ID_LENGTH);
    }

    #[tokio::test]
    async fn unknown_room_is_not_found() {
        let registry = RoomRegistry::new();

        assert_eq!(
            registry.find_room("missing").await,
            Err(RegistryError::RoomNotFound)
        );
        assert_eq!(
            registry.join_room("missing", "bob", "").await.unwrap_err(),
            RegistryError::RoomNotFound
        );
    }

    #[tokio::test]
    async fn password_gates_joining() {
        let registry = RoomRegistry::new();
        let (room, host) = registry.create_room("Private", "secret", "alice").await;

        assert_eq!(
            registry
                .join_room(room.id.as_str(), "bob", "wrong")
                .await
                .unwrap_err(),
            RegistryError::WrongPassword
        );

        let (joined_room, bob) = registry
            .join_room(room.id.as_str(), "bob", "secret")
            .await
            .unwrap();
        assert_ne!(bob.id(), host.id());
        assert!(!bob.is_host());
        assert_eq!(joined_room.member_count, 2);
    }

    #[tokio::test]
    async fn open_room_admits_any_password() {
        let registry = RoomRegistry::new();
        let (room, _) = registry.create_room("Open", "", "alice").await;

        assert!(
            registry
                .join_room(room.id.as_str(), "bob", "whatever")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn host_departure_closes_the_room() {
        let registry = RoomRegistry::new();
        let (room, host) = registry.create_room("General", "", "alice").await;
        let (_, bob) = registry.join_room(room.id.as_str(), "bob", "").await.unwrap();
        registry
            .learn_address(room.id.as_str(), bob.id().as_str(), addr(4000))
            .await
            .unwrap();

        let departure = registry
            .remove_member(room.id.as_str(), host.id().as_str())
            .await
            .unwrap();

        assert!(departure.room_closed);
        assert_eq!(departure.member_name, "alice");
        assert_eq!(departure.notify, vec![addr(4000)]);
        assert_eq!(
            registry.find_room(room.id.as_str()).await,
            Err(RegistryError::RoomNotFound)
        );
    }

    #[tokio::test]
    async fn guest_departure_keeps_the_room() {
        let registry = RoomRegistry::new();
        let (room, host) = registry.create_room("General", "", "alice").await;
        let (_, bob) = registry.join_room(room.id.as_str(), "bob", "").await.unwrap();
        let (_, carol) = registry.join_room(room.id.as_str(), "carol", "").await.unwrap();

        let departure = registry
            .remove_member(room.id.as_str(), bob.id().as_str())
            .await
            .unwrap();
        assert!(!departure.room_closed);
        assert_eq!(departure.member_name, "bob");
        assert!(departure.notify.is_empty());

        let remaining = registry.list_members(room.id.as_str()).await.unwrap();
        let mut ids: Vec<&str> = remaining.iter().map(|m| m.id().as_str()).collect();
        ids.sort();
        let mut expected = vec![host.id().as_str(), carol.id().as_str()];
        expected.sort();
        assert_eq!(ids, expected);

        assert_eq!(
            registry.find_room(room.id.as_str()).await.unwrap().member_count,
            2
        );
    }

    #[tokio::test]
    async fn removing_unknown_member_fails() {
        let registry = RoomRegistry::new();
        let (room, _) = registry.create_room("General", "", "alice").await;

        assert_eq!(
            registry
                .remove_member(room.id.as_str(), "nobody")
                .await
                .unwrap_err(),
            RegistryError::MemberNotFound
        );
        assert_eq!(
            registry.remove_member("missing", "nobody").await.unwrap_err(),
            RegistryError::RoomNotFound
        );
    }

    #[tokio::test]
    async fn relearning_replaces_the_address() {
        let registry = RoomRegistry::new();
        let (room, host) = registry.create_room("General", "", "alice").await;
        let room_id = room.id.as_str();
        let host_id = host.id().as_str();

        registry.learn_address(room_id, host_id, addr(4000)).await.unwrap();
        registry.learn_address(room_id, host_id, addr(5000)).await.unwrap();

        let members = registry.list_members(room_id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].address(), Some(addr(5000)));
    }

    #[tokio::test]
    async fn learning_requires_membership() {
        let registry = RoomRegistry::new();
        let (room, _) = registry.create_room("General", "", "alice").await;

        assert_eq!(
            registry
                .learn_address(room.id.as_str(), "stranger", addr(4000))
                .await,
            Err(RegistryError::MemberNotFound)
        );
        assert_eq!(
            registry.learn_address("missing", "stranger", addr(4000)).await,
            Err(RegistryError::RoomNotFound)
        );
    }

    #[tokio::test]
    async fn messages_are_logged_for_members_only() {
        let registry = RoomRegistry::new();
        let (room, host) = registry.create_room("General", "", "alice").await;
        let room_id = room.id.as_str();

        registry
            .record_message(room_id, host.id().as_str(), "hi")
            .await
            .unwrap();
        assert_eq!(
            registry.record_message(room_id, "stranger", "hi").await,
            Err(RegistryError::MemberNotFound)
        );

        assert_eq!(registry.message_count(room_id).await.unwrap(), 1);
    }
}
