//! Staged request builders
//!
//! Each verb returns a builder that only exposes the calls PostgREST accepts
//! for it:
//!
//! - [`RequestBuilder`]: the root, created by [`PostgrestClient::from`](crate::PostgrestClient::from)
//! - [`SelectBuilder`]: filters and transforms (`order`, `range`, `limit`, `offset`)
//! - [`FilterBuilder`]: filters only (update, delete)
//! - [`QueryBuilder`]: no filters (insert, upsert)

use std::marker::PhantomData;

use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::execute::{Payload, QueryRequest};
use crate::filter::{self, FilterOperator};
use crate::types::{
    Order, RETURN_REPRESENTATION, RETURN_REPRESENTATION_MERGE_DUPLICATES, SINGLE_OBJECT,
};

/// Marker for builders created by `select`.
#[derive(Debug)]
pub enum Selection {}

/// Marker for builders created by `update` and `delete`.
#[derive(Debug)]
pub enum Mutation {}

/// Builder for a select: filters plus transforms.
pub type SelectBuilder = FilterBuilder<Selection>;

/// Root builder for a table or view.
#[derive(Debug)]
pub struct RequestBuilder {
    request: QueryRequest,
}

impl RequestBuilder {
    pub(crate) fn new(request: QueryRequest) -> Self {
        Self { request }
    }

    /// Start a `GET` returning `columns`, joined with commas.
    ///
    /// No default is injected: pass `["*"]` for every column. An empty list
    /// sends `select=`.
    pub fn select<I, S>(mut self, columns: I) -> SelectBuilder
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = columns
            .into_iter()
            .map(|column| column.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.request.params.set("select", &columns);
        self.request.method = Method::GET;
        FilterBuilder::new(self.request)
    }

    /// Insert `values` and get the created row back as a single object.
    pub fn insert<T: Serialize>(mut self, values: T) -> QueryBuilder {
        self.request.method = Method::POST;
        self.request.payload = Payload::from_serialize(values);
        self.request.set_prefer(RETURN_REPRESENTATION);
        self.request.set_accept(SINGLE_OBJECT);
        QueryBuilder {
            request: self.request,
        }
    }

    /// Insert `values`, merging rows that collide on the primary key.
    pub fn upsert<T: Serialize>(mut self, values: T) -> QueryBuilder {
        self.request.method = Method::POST;
        self.request.payload = Payload::from_serialize(values);
        self.request
            .set_prefer(RETURN_REPRESENTATION_MERGE_DUPLICATES);
        QueryBuilder {
            request: self.request,
        }
    }

    /// Update the rows matched by the filters that follow.
    pub fn update<T: Serialize>(mut self, values: T) -> FilterBuilder<Mutation> {
        self.request.method = Method::PATCH;
        self.request.payload = Payload::from_serialize(values);
        self.request.set_prefer(RETURN_REPRESENTATION);
        FilterBuilder::new(self.request)
    }

    /// Delete the rows matched by the filters that follow.
    pub fn delete(mut self) -> FilterBuilder<Mutation> {
        self.request.method = Method::DELETE;
        self.request.payload = Payload::Empty;
        FilterBuilder::new(self.request)
    }
}

/// Terminal-only builder returned by `insert` and `upsert`.
#[derive(Debug)]
pub struct QueryBuilder {
    request: QueryRequest,
}

impl QueryBuilder {
    /// Send the request and decode the body into `T`.
    ///
    /// Returns `Ok(None)` on `204 No Content`.
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Option<T>> {
        self.request.execute().await
    }

    /// Send the request without asking for a representation back.
    pub async fn execute_no_return(self) -> Result<()> {
        self.request.execute_no_return().await
    }
}

/// Builder that accepts filters.
///
/// `FilterBuilder<Selection>` (aka [`SelectBuilder`]) additionally accepts
/// transforms.
#[derive(Debug)]
pub struct FilterBuilder<M = Mutation> {
    request: QueryRequest,
    negate_next: bool,
    _mode: PhantomData<fn() -> M>,
}

impl<M> FilterBuilder<M> {
    fn new(request: QueryRequest) -> Self {
        Self {
            request,
            negate_next: false,
            _mode: PhantomData,
        }
    }

    /// Negate the next filter, and only the next one.
    pub fn not(mut self) -> Self {
        self.negate_next = true;
        self
    }

    /// Add `column=[not.]operator.criteria`.
    ///
    /// `operator` is either a [`FilterOperator`] or a raw token. Repeated
    /// columns are all kept.
    pub fn filter(mut self, column: &str, operator: impl AsRef<str>, criteria: &str) -> Self {
        let negate = std::mem::take(&mut self.negate_next);
        let (key, value) = filter::encode(column, operator.as_ref(), criteria, negate);
        self.request.params.add(&key, &value);
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, FilterOperator::Eq, &value.to_string())
    }

    pub fn neq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, FilterOperator::Neq, &value.to_string())
    }

    pub fn gt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, FilterOperator::Gt, &value.to_string())
    }

    pub fn gte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, FilterOperator::Gte, &value.to_string())
    }

    pub fn lt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, FilterOperator::Lt, &value.to_string())
    }

    pub fn lte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, FilterOperator::Lte, &value.to_string())
    }

    /// Case-sensitive pattern match; `*` is the wildcard.
    pub fn like(self, column: &str, pattern: &str) -> Self {
        self.filter(column, FilterOperator::Like, pattern)
    }

    /// Case-insensitive pattern match.
    pub fn ilike(self, column: &str, pattern: &str) -> Self {
        self.filter(column, FilterOperator::ILike, pattern)
    }

    /// `null`, `true`, `false` or `unknown`.
    pub fn is(self, column: &str, value: &str) -> Self {
        self.filter(column, FilterOperator::Is, value)
    }

    /// `column=in.(a,b,c)`
    pub fn in_list<T: ToString>(self, column: &str, values: &[T]) -> Self {
        self.filter(column, FilterOperator::In, &filter::list(values))
    }

    pub fn fts(self, column: &str, query: &str) -> Self {
        self.filter(column, FilterOperator::Fts, query)
    }

    pub fn plfts(self, column: &str, query: &str) -> Self {
        self.filter(column, FilterOperator::Plfts, query)
    }

    pub fn wfts(self, column: &str, query: &str) -> Self {
        self.filter(column, FilterOperator::Wfts, query)
    }

    /// `column=cs.{a,b,c}`
    pub fn cs<T: ToString>(self, column: &str, values: &[T]) -> Self {
        self.filter(column, FilterOperator::Cs, &filter::set(values))
    }

    /// `column=cd.{a,b,c}`
    pub fn cd<T: ToString>(self, column: &str, values: &[T]) -> Self {
        self.filter(column, FilterOperator::Cd, &filter::set(values))
    }

    /// `column=ov.{a,b,c}`
    pub fn ov<T: ToString>(self, column: &str, values: &[T]) -> Self {
        self.filter(column, FilterOperator::Ov, &filter::set(values))
    }

    /// `column=adj.{a,b,c}`
    pub fn ad<T: ToString>(self, column: &str, values: &[T]) -> Self {
        self.filter(column, FilterOperator::Adj, &filter::set(values))
    }

    /// `column=sl.(from,to)`
    pub fn sl(self, column: &str, from: i64, to: i64) -> Self {
        self.filter(column, FilterOperator::Sl, &filter::range(from, to))
    }

    pub fn sr(self, column: &str, from: i64, to: i64) -> Self {
        self.filter(column, FilterOperator::Sr, &filter::range(from, to))
    }

    pub fn nxl(self, column: &str, from: i64, to: i64) -> Self {
        self.filter(column, FilterOperator::Nxl, &filter::range(from, to))
    }

    pub fn nxr(self, column: &str, from: i64, to: i64) -> Self {
        self.filter(column, FilterOperator::Nxr, &filter::range(from, to))
    }

    /// Ask for a single object instead of an array.
    ///
    /// The server rejects the request unless exactly one row matches; that
    /// error is returned from `execute` as is.
    pub fn single(mut self) -> Self {
        self.request.set_accept(SINGLE_OBJECT);
        self
    }

    /// Send the request and decode the body into `T`.
    ///
    /// Returns `Ok(None)` on `204 No Content`.
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Option<T>> {
        self.request.execute().await
    }

    /// Send the request without asking for a representation back.
    pub async fn execute_no_return(self) -> Result<()> {
        self.request.execute_no_return().await
    }
}

impl FilterBuilder<Selection> {
    /// Order by `column`. Calling it again adds a secondary ordering.
    pub fn order(mut self, column: &str, order: Order) -> Self {
        let ordering = format!("{}.{}", column, order);
        let value = match self.request.params.get("order") {
            Some(existing) if !existing.is_empty() => format!("{},{}", existing, ordering),
            _ => ordering,
        };
        self.request.params.set("order", &value);
        self
    }

    /// Rows `from..=to`, sent as `offset=from&limit=to-from+1`.
    ///
    /// The limit saturates at `i64::MAX`.
    pub fn range(mut self, from: i64, to: i64) -> Self {
        let count = to.saturating_sub(from).saturating_add(1);
        self.request.params.set("offset", &from.to_string());
        self.request.params.set("limit", &count.to_string());
        self
    }

    pub fn limit(mut self, count: i64) -> Self {
        self.request.params.set("limit", &count.to_string());
        self
    }

    /// Skip `count` rows.
    pub fn offset(mut self, count: i64) -> Self {
        self.request.params.set("offset", &count.to_string());
        self
    }
}
