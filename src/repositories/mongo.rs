//! MongoDB 기반 Keyed Store
//!
//! 엔티티의 `id` 필드를 키로 사용하여 컬렉션 하나에 매핑됩니다.
//! 초기화 시 `id`에 고유 인덱스를 만들어, 동시에 들어온 같은 `id`의 추가 중 하나만 성공합니다.
//! 중복 키(E11000)는 `ValidationFailed(id)`로, 그 외 드라이버 에러는 모두 일시적 저장소
//! 장애(`StoreUnavailable`)로 분류됩니다.

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::errors::{AppError, AppResult};
use crate::core::registry::Lifecycle;
use crate::db::Database;
use crate::repositories::{Keyed, KeyedStore};

pub struct MongoStore<V> {
    database: Arc<Database>,
    collection_name: String,
    _entity: PhantomData<fn() -> V>,
}

impl<V> MongoStore<V>
where
    V: Send + Sync,
{
    pub fn new(database: Arc<Database>, collection_name: impl Into<String>) -> Self {
        Self {
            database,
            collection_name: collection_name.into(),
            _entity: PhantomData,
        }
    }

    fn collection(&self) -> Collection<V> {
        self.database.get_database().collection::<V>(&self.collection_name)
    }
}

/// `{ "id": <key> }` 필터 문서를 만듭니다.
fn id_filter<K: Into<Bson>>(id: K) -> Document {
    let mut filter = Document::new();
    filter.insert("id", id);
    filter
}

const DUPLICATE_KEY: i32 = 11000;

/// `id` 고유 인덱스
fn id_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! { "id": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn write_error_code(error: &mongodb::error::Error) -> Option<i32> {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => Some(write_error.code),
        _ => None,
    }
}

fn store_error(collection: &str, operation: &str, error: impl Display) -> AppError {
    warn!("MongoDB {} on {} failed: {}", operation, collection, error);
    AppError::StoreUnavailable(format!("{} on {} failed: {}", operation, collection, error))
}

/// `insert_one` 실패를 분류합니다. 고유 인덱스 위반은 중복 추가입니다.
fn insert_error(collection: &str, key: impl Display, code: Option<i32>, error: impl Display) -> AppError {
    if code == Some(DUPLICATE_KEY) {
        return AppError::field("id", format!("{} {} already exists", collection, key));
    }
    store_error(collection, "insert_one", error)
}

#[async_trait]
impl<V> Lifecycle for MongoStore<V>
where
    V: Send + Sync,
{
    fn name(&self) -> &str {
        &self.collection_name
    }

    async fn init(&self) -> AppResult<()> {
        self.collection()
            .create_index(id_index())
            .await
            .map_err(|e| store_error(&self.collection_name, "create_index", e))?;
        info!("🔑 {}: unique id index ready", self.collection_name);
        Ok(())
    }
}

#[async_trait]
impl<K, V> KeyedStore<K, V> for MongoStore<V>
where
    K: Into<Bson> + Clone + Display + Send + Sync + 'static,
    V: Keyed<Key = K> + Serialize + DeserializeOwned + Unpin + Send + Sync + 'static,
{
    async fn get_all(&self) -> AppResult<Vec<V>> {
        let cursor = self
            .collection()
            .find(Document::new())
            .await
            .map_err(|e| store_error(&self.collection_name, "find", e))?;

        cursor
            .try_collect::<Vec<V>>()
            .await
            .map_err(|e| store_error(&self.collection_name, "find", e))
    }

    async fn get_by_id(&self, id: &K) -> AppResult<Option<V>> {
        self.collection()
            .find_one(id_filter(id.clone()))
            .await
            .map_err(|e| store_error(&self.collection_name, "find_one", e))
    }

    async fn add(&self, value: V) -> AppResult<()> {
        let key = value.key();
        self.collection().insert_one(&value).await.map_err(|e| {
            let code = write_error_code(&e);
            insert_error(&self.collection_name, &key, code, e)
        })?;
        debug!("{}: inserted {}", self.collection_name, key);
        Ok(())
    }

    async fn update(&self, value: V) -> AppResult<()> {
        let key = value.key();
        let result = self
            .collection()
            .replace_one(id_filter(key.clone()), &value)
            .await
            .map_err(|e| store_error(&self.collection_name, "replace_one", e))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "{} {} not found",
                self.collection_name, key
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &K) -> AppResult<()> {
        let result = self
            .collection()
            .delete_one(id_filter(id.clone()))
            .await
            .map_err(|e| store_error(&self.collection_name, "delete_one", e))?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "{} {} not found",
                self.collection_name, id
            )));
        }
        Ok(())
    }

    async fn exists(&self, id: &K) -> AppResult<bool> {
        let count = self
            .collection()
            .count_documents(id_filter(id.clone()))
            .await
            .map_err(|e| store_error(&self.collection_name, "count_documents", e))?;
        Ok(count > 0)
    }
}
