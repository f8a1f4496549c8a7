//! InMemory Connection Registry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! 接続本体（ConnectionId → Connection）とルーム所属（RoomKey → ConnectionId の集合）を
//! 1 つの RwLock の下で管理します。
//!
//! ## ロックの範囲
//!
//! 書き込みロックは admit / evict の変更中だけ保持します。`room_members` は
//! 読み込みロックの下でスナップショットをコピーして返すため、配送（送信）中に
//! ロックを保持することはありません。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{AdmitOutcome, Connection, ConnectionId, ConnectionRegistry, EvictOutcome, RoomKey};

#[derive(Debug, Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<RoomKey, HashSet<ConnectionId>>,
}

/// インメモリ Connection Registry 実装
#[derive(Debug, Default)]
pub struct InMemoryConnectionRegistry {
    state: RwLock<RegistryState>,
}

impl InMemoryConnectionRegistry {
    /// 新しい InMemoryConnectionRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn admit(&self, connection: Connection) -> AdmitOutcome {
        let mut state = self.state.write().await;

        if state.connections.contains_key(&connection.id) {
            tracing::debug!("Connection '{}' already admitted, ignoring", connection.id);
            return AdmitOutcome::AlreadyAdmitted;
        }

        let user_room = RoomKey::User(connection.user_id);
        let first_for_user = state
            .rooms
            .get(&user_room)
            .is_none_or(|members| members.is_empty());

        for room in connection.rooms() {
            state.rooms.entry(room).or_default().insert(connection.id);
        }
        tracing::debug!(
            "Connection '{}' admitted for user {} (first_for_user={})",
            connection.id,
            connection.user_id,
            first_for_user
        );
        state.connections.insert(connection.id, connection);

        AdmitOutcome::Admitted { first_for_user }
    }

    async fn evict(&self, connection_id: &ConnectionId) -> EvictOutcome {
        let mut state = self.state.write().await;

        let Some(connection) = state.connections.remove(connection_id) else {
            return EvictOutcome::NotRegistered;
        };

        for room in connection.rooms() {
            if let Some(members) = state.rooms.get_mut(&room) {
                members.remove(connection_id);
                if members.is_empty() {
                    state.rooms.remove(&room);
                }
            }
        }
        let last_for_user = !state.rooms.contains_key(&RoomKey::User(connection.user_id));
        tracing::debug!(
            "Connection '{}' evicted for user {} (last_for_user={})",
            connection.id,
            connection.user_id,
            last_for_user
        );

        EvictOutcome::Evicted {
            connection,
            last_for_user,
        }
    }

    async fn room_members(&self, room: &RoomKey) -> Vec<Connection> {
        let state = self.state.read().await;
        let Some(members) = state.rooms.get(room) else {
            return Vec::new();
        };

        let mut connections: Vec<Connection> = members
            .iter()
            .filter_map(|id| state.connections.get(id))
            .cloned()
            .collect();
        connections.sort_by_key(|c| (c.admitted_at, c.id));
        connections
    }

    async fn get(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let state = self.state.read().await;
        state.connections.get(connection_id).cloned()
    }

    async fn connection_count(&self) -> usize {
        let state = self.state.read().await;
        state.connections.len()
    }
}
