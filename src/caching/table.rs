//! # 캐시 테이블
//!
//! 엔티티 타입 하나당 하나씩 존재하는 `K → CacheEntry<K, V>` 메모리 테이블입니다.
//!
//! ## 불변식
//!
//! - 항목은 `now < expires_at`인 동안에만 읽기에 유효하며, 만료된 항목은 없는 것으로 취급됩니다.
//!   TTL이 너무 커서 만료 시각을 표현할 수 없으면 항목은 만료되지 않습니다.
//! - 잠금은 동기식(`std::sync::RwLock`)이며 await 지점을 넘어 유지되지 않습니다.
//! - 무효화가 완료된 뒤에는 그 이전에 시작된 조회가 오래된 값을 다시 채울 수 없습니다.
//! - 키별 무효화 세대는 그 키의 채우기 티켓이 살아 있는 동안에만 유지됩니다.
//!
//! ## 채우기 티켓
//!
//! 캐시 미스는 [`FillTicket`]을 돌려줍니다. 티켓은 미스 시점의 키별 무효화 세대와
//! 테이블 전체 세대(`clear` 횟수)를 담고 있으며, [`CacheTable::fill`]은 그 사이에
//! 무효화가 있었다면 삽입을 거부합니다. 티켓이 채우기에 쓰이든, 조회 실패나 취소로
//! 버려지든 drop 시점에 키의 대기 수가 줄고, 0이 되면 세대 기록도 제거됩니다.
//!
//! ```text
//! reader: lookup(5) → Miss(t0) ──── store.get_by_id(5) ─────────── fill(t0, old) ✗ 거부
//! writer:                 store.update(5) → invalidate(5) (세대 +1)
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::time::Instant;

/// 캐시에 저장된 엔티티 스냅샷
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    pub key: K,
    pub value: V,
    pub inserted_at: Instant,
    /// `None`이면 만료되지 않음
    pub expires_at: Option<Instant>,
}

impl<K, V> CacheEntry<K, V> {
    pub fn new(key: K, value: V, ttl: Duration) -> Self {
        let inserted_at = Instant::now();
        Self {
            key,
            value,
            inserted_at,
            expires_at: inserted_at.checked_add(ttl),
        }
    }

    pub fn is_valid_at(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Instant::now())
    }
}

/// 캐시 미스 시 발급되는 채우기 권한
///
/// 발급한 테이블을 빌리며, drop 시 해당 키의 대기 수를 되돌립니다.
pub struct FillTicket<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    table: &'a CacheTable<K, V>,
    key: K,
    epoch: u64,
    generation: u64,
}

impl<K, V> FillTicket<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K, V> fmt::Debug for FillTicket<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillTicket")
            .field("table", &self.table.name)
            .field("epoch", &self.epoch)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<K, V> PartialEq for FillTicket<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.table, other.table)
            && self.key == other.key
            && self.epoch == other.epoch
            && self.generation == other.generation
    }
}

impl<K, V> Drop for FillTicket<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn drop(&mut self) {
        self.table.release(&self.key);
    }
}

/// 조회 결과
#[derive(Debug, PartialEq)]
pub enum Lookup<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    Hit(V),
    Miss(FillTicket<'a, K, V>),
}

/// 채우기 티켓이 살아 있는 키의 대기 수와 무효화 세대
#[derive(Debug, Default)]
struct Pending {
    tickets: usize,
    generation: u64,
}

struct TableState<K, V> {
    entries: HashMap<K, CacheEntry<K, V>>,
    pending: HashMap<K, Pending>,
    epoch: u64,
}

pub struct CacheTable<K, V> {
    name: String,
    ttl: Duration,
    state: RwLock<TableState<K, V>>,
}

impl<K, V> CacheTable<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            ttl,
            state: RwLock::new(TableState {
                entries: HashMap::new(),
                pending: HashMap::new(),
                epoch: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn read(&self) -> RwLockReadGuard<'_, TableState<K, V>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableState<K, V>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 유효한 항목이 있으면 `Hit`, 없거나 만료되었으면 `Miss`를 반환합니다.
    ///
    /// 만료된 항목은 이 시점에 제거됩니다.
    pub fn lookup(&self, key: &K) -> Lookup<'_, K, V> {
        let now = Instant::now();
        {
            let state = self.read();
            if let Some(entry) = state.entries.get(key) {
                if entry.is_valid_at(now) {
                    return Lookup::Hit(entry.value.clone());
                }
            }
        }

        let mut state = self.write();
        if let Some(entry) = state.entries.get(key) {
            if entry.is_valid_at(now) {
                return Lookup::Hit(entry.value.clone());
            }
        }
        state.entries.remove(key);

        let epoch = state.epoch;
        let pending = state.pending.entry(key.clone()).or_default();
        pending.tickets += 1;

        Lookup::Miss(FillTicket {
            table: self,
            key: key.clone(),
            epoch,
            generation: pending.generation,
        })
    }

    /// 미스 이후 저장소에서 읽은 값을 티켓의 키로 삽입합니다.
    ///
    /// 티켓 발급 이후 키가 무효화되었거나 테이블이 비워졌으면 삽입하지 않고 `false`를 반환합니다.
    pub fn fill(&self, ticket: FillTicket<'_, K, V>, value: V) -> bool {
        let mut state = self.write();
        let current = state
            .pending
            .get(&ticket.key)
            .map(|pending| pending.generation);
        let accepted = state.epoch == ticket.epoch && current == Some(ticket.generation);

        if accepted {
            let entry = CacheEntry::new(ticket.key.clone(), value, self.ttl);
            state.entries.insert(ticket.key.clone(), entry);
        }
        // 티켓 drop이 같은 잠금을 다시 잡으므로 먼저 놓습니다.
        drop(state);
        drop(ticket);
        accepted
    }

    fn release(&self, key: &K) {
        let mut state = self.write();
        if let Some(pending) = state.pending.get_mut(key) {
            pending.tickets = pending.tickets.saturating_sub(1);
            if pending.tickets == 0 {
                state.pending.remove(key);
            }
        }
    }

    /// 키에 해당하는 항목을 제거하고, 진행 중인 채우기를 무효로 만듭니다.
    ///
    /// 항목이 있었으면 `true`를 반환합니다.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut state = self.write();
        if let Some(pending) = state.pending.get_mut(key) {
            pending.generation += 1;
        }
        state.entries.remove(key).is_some()
    }

    /// 모든 항목을 제거합니다. 제거된 항목 수를 반환합니다.
    pub fn clear(&self) -> usize {
        let mut state = self.write();
        let removed = state.entries.len();
        state.entries.clear();
        state.epoch += 1;
        removed
    }

    /// 만료된 항목을 모두 제거합니다. 제거된 항목 수를 반환합니다.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.write();
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.is_valid_at(now));
        before - state.entries.len()
    }

    /// 만료 여부와 관계없이 테이블에 남아 있는 항목 수
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 유효한 항목을 가지고 있는지 여부 (조회 통계에 영향 없음)
    pub fn contains_valid(&self, key: &K) -> bool {
        self.read().entries.get(key).is_some_and(|entry| entry.is_valid())
    }

    /// 채우기 티켓이 살아 있는 키의 수
    pub fn in_flight(&self) -> usize {
        self.read().pending.len()
    }
}
