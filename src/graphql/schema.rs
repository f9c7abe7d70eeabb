//! GraphQL schema definition with queries, mutations, and subscriptions

use async_graphql::{MergedObject, Schema};

use crate::db::Database;
use crate::services::{AuthService, CatalogService};

use super::mutations::{CatalogMutations, UserMutations};
use super::queries::{CatalogQueries, UserQueries};
use super::subscriptions::SubscriptionRoot;

#[derive(MergedObject, Default)]
pub struct QueryRoot(CatalogQueries, UserQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(CatalogMutations, UserMutations);

/// The GraphQL schema type
pub type BookshelfSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the GraphQL schema with all resolvers
pub fn build_schema(db: Database, auth: AuthService, catalog: CatalogService) -> BookshelfSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), SubscriptionRoot)
        .data(db)
        .data(auth)
        .data(catalog)
        .extension(async_graphql::extensions::Tracing)
        .finish()
}
