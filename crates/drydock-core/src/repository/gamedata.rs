//! Game-data catalogue repository trait definition.

use drydock_types::error::RepositoryError;
use drydock_types::gamedata::{
    GameDataBundle, GameDataImportSummary, ItemGroup, ItemType, ItemTypeId, MarketGroup,
};

/// Read access to the static catalogue, plus bulk loading.
pub trait GameDataRepository: Send + Sync {
    fn get_item(
        &self,
        id: ItemTypeId,
    ) -> impl std::future::Future<Output = Result<Option<ItemType>, RepositoryError>> + Send;

    /// Fetch several items at once. Unknown IDs are silently absent from the result.
    fn get_items(
        &self,
        ids: &[ItemTypeId],
    ) -> impl std::future::Future<Output = Result<Vec<ItemType>, RepositoryError>> + Send;

    fn get_group(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<ItemGroup>, RepositoryError>> + Send;

    /// Groups of a category, ordered by name.
    fn groups_in_category(
        &self,
        category_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ItemGroup>, RepositoryError>> + Send;

    /// Items of a group, ordered by name.
    fn items_in_group(
        &self,
        group_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ItemType>, RepositoryError>> + Send;

    fn get_market_group(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<MarketGroup>, RepositoryError>> + Send;

    /// IDs of every item in the skill category.
    fn skill_ids(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ItemTypeId>, RepositoryError>> + Send;

    /// Upsert a catalogue bundle in one transaction.
    fn import_bundle(
        &self,
        bundle: &GameDataBundle,
    ) -> impl std::future::Future<Output = Result<GameDataImportSummary, RepositoryError>> + Send;
}
