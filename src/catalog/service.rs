use std::future::Future;
use std::time::Instant;

use super::context::RequestContext;
use super::hooks::{Endpoint, ExtensionPoint, HookEvent, Hooks, Interceptor, Invocation, Outcome};
use super::repository::{AllVisible, CategoryRepository, ContentRepository, Settings, VisibilityFilter};
use super::views::{FeedResponse, IndexView, ItemCount, ListingView};
use crate::content::{
    list_page, project_feed, rank_latest_and_popular, Clock, FeedView, Media, MediaId, OrderKey,
    SystemClock, DEFAULT_FEED_LIMIT, DEFAULT_LANDING_COUNT, DEFAULT_PAGE_SIZE,
};
use crate::error::CatalogError;
use crate::util::validate_limit;

/// Sizes and limits applied by the endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub landing_count: usize,
    pub page_size: usize,
    pub feed_default_limit: usize,
    pub feed_max_limit: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            landing_count: DEFAULT_LANDING_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
            feed_default_limit: DEFAULT_FEED_LIMIT,
            feed_max_limit: 100,
        }
    }
}

/// Feed switched on unless configured otherwise.
struct FeedOn;

impl Settings for FeedOn {
    fn feed_enabled(&self) -> bool {
        true
    }
}

/// The `index`, `more` and `feed` endpoints over one repository.
///
/// The catalog holds no per-request state; concurrent calls share it
/// read-only.
pub struct Catalog<R> {
    repo: R,
    options: ViewOptions,
    settings: Box<dyn Settings>,
    visibility: Box<dyn VisibilityFilter>,
    clock: Box<dyn Clock>,
    hooks: Hooks,
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl<R> Catalog<R>
where
    R: CategoryRepository + ContentRepository,
{
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            options: ViewOptions::default(),
            settings: Box::new(FeedOn),
            visibility: Box::new(AllVisible),
            clock: Box::new(SystemClock),
            hooks: Hooks::new(),
            interceptors: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: ViewOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_settings(mut self, settings: impl Settings + 'static) -> Self {
        self.settings = Box::new(settings);
        self
    }

    pub fn with_visibility(mut self, visibility: impl VisibilityFilter + 'static) -> Self {
        self.visibility = Box::new(visibility);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Append an interceptor; earlier ones run first on the way in.
    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn options(&self) -> ViewOptions {
        self.options
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// Landing view: the newest items and the most popular of the rest.
    pub async fn index(&self, slug: Option<&str>) -> Result<IndexView, CatalogError> {
        let invocation = Invocation::new(Endpoint::Index, slug);
        self.intercept(&invocation, || self.run_index(slug)).await
    }

    /// One page of the scope's items in the requested order.
    pub async fn more(
        &self,
        slug: &str,
        order: OrderKey,
        page: i64,
    ) -> Result<ListingView, CatalogError> {
        let invocation = Invocation::new(Endpoint::More, Some(slug))
            .with_param("order", order)
            .with_param("page", page);
        self.intercept(&invocation, || self.run_more(slug, order, page))
            .await
    }

    /// The newest items of the scope, bounded by a validated `limit`.
    ///
    /// # Errors
    ///
    /// Checked in order: [`CatalogError::NotFound`] or
    /// [`CatalogError::Integrity`] while resolving the scope, then
    /// [`CatalogError::Validation`] for a malformed limit, then
    /// [`CatalogError::FeatureDisabled`] when feeds are switched off.
    pub async fn feed(
        &self,
        slug: Option<&str>,
        limit: Option<&str>,
    ) -> Result<FeedResponse, CatalogError> {
        let mut invocation = Invocation::new(Endpoint::Feed, slug);
        if let Some(limit) = limit {
            invocation = invocation.with_param("limit", limit);
        }
        self.intercept(&invocation, || self.run_feed(slug, limit))
            .await
    }

    // ========================================================================
    // Endpoint bodies
    // ========================================================================

    async fn run_index(&self, slug: Option<&str>) -> Result<IndexView, CatalogError> {
        let context = self.load_context(slug).await?;
        let snapshot = self.repo.media_snapshot().await?;
        let selected = self.select(Endpoint::Index, &context, &snapshot);

        self.hooks.fire(ExtensionPoint::BeforeRanking, || {
            event(ExtensionPoint::BeforeRanking, Endpoint::Index, &context, &selected)
        });
        let ranked = rank_latest_and_popular(selected, self.options.landing_count);
        self.hooks.fire(ExtensionPoint::AfterRanking, || {
            let mut ranked_ids = ranked.latest.clone();
            ranked_ids.extend(ranked.popular.iter().copied());
            event(ExtensionPoint::AfterRanking, Endpoint::Index, &context, &ranked_ids)
        });

        Ok(IndexView {
            scope: context.summary(),
            latest: ranked.latest.into_iter().cloned().collect(),
            popular: ranked.popular.into_iter().cloned().collect(),
        })
    }

    async fn run_more(
        &self,
        slug: &str,
        order: OrderKey,
        page: i64,
    ) -> Result<ListingView, CatalogError> {
        let context = self.load_context(Some(slug)).await?;
        let snapshot = self.repo.media_snapshot().await?;
        let selected = self.select(Endpoint::More, &context, &snapshot);

        self.hooks.fire(ExtensionPoint::BeforeRanking, || {
            event(ExtensionPoint::BeforeRanking, Endpoint::More, &context, &selected)
        });
        let page = list_page(selected, order, page, self.options.page_size);
        self.hooks.fire(ExtensionPoint::AfterRanking, || {
            event(ExtensionPoint::AfterRanking, Endpoint::More, &context, &page.items)
        });

        Ok(ListingView {
            scope: context.summary(),
            order,
            page: page.map(Media::clone),
        })
    }

    async fn run_feed(
        &self,
        slug: Option<&str>,
        limit: Option<&str>,
    ) -> Result<FeedResponse, CatalogError> {
        let context = self.load_context(slug).await?;
        let limit = validate_limit(
            limit,
            self.options.feed_default_limit,
            self.options.feed_max_limit,
        )?;
        if !self.settings.feed_enabled() {
            return Err(CatalogError::FeatureDisabled("feed"));
        }

        let snapshot = self.repo.media_snapshot().await?;
        let selected = self.select(Endpoint::Feed, &context, &snapshot);

        self.hooks.fire(ExtensionPoint::BeforeRanking, || {
            event(ExtensionPoint::BeforeRanking, Endpoint::Feed, &context, &selected)
        });
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let feed = project_feed(selected, limit, context.feed_title());
        self.hooks.fire(ExtensionPoint::AfterRanking, || {
            event(ExtensionPoint::AfterRanking, Endpoint::Feed, &context, &feed.items)
        });

        Ok(FeedResponse {
            scope: context.summary(),
            feed: FeedView {
                title: feed.title,
                items: feed.items.into_iter().cloned().collect(),
            },
        })
    }

    // ========================================================================
    // Shared steps
    // ========================================================================

    async fn load_context(&self, slug: Option<&str>) -> Result<RequestContext, CatalogError> {
        let now = self.clock.now();
        let records = self.repo.categories(now).await?;
        RequestContext::build(records, slug, now)
    }

    /// Published items of the scope that pass the visibility filter.
    fn select<'a>(
        &self,
        endpoint: Endpoint,
        context: &RequestContext,
        snapshot: &'a [Media],
    ) -> Vec<&'a Media> {
        self.hooks.fire(ExtensionPoint::BeforeSelection, || HookEvent {
            point: ExtensionPoint::BeforeSelection,
            endpoint,
            slug: context.slug().map(str::to_string),
            media_ids: snapshot.iter().map(|m| m.id).collect(),
        });

        let selected: Vec<&Media> = context
            .scope_filter()
            .apply(snapshot)
            .into_iter()
            .filter(|media| self.visibility.is_visible(media))
            .collect();

        self.hooks.fire(ExtensionPoint::AfterSelection, || {
            event(ExtensionPoint::AfterSelection, endpoint, context, &selected)
        });
        tracing::debug!(
            %endpoint,
            snapshot = snapshot.len(),
            selected = selected.len(),
            "Selected media"
        );
        selected
    }

    async fn intercept<T, F, Fut>(&self, invocation: &Invocation, run: F) -> Result<T, CatalogError>
    where
        T: ItemCount,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let started = Instant::now();

        let mut entered = 0;
        let mut rejected = None;
        for interceptor in &self.interceptors {
            if let Err(err) = interceptor.before(invocation) {
                rejected = Some(err);
                break;
            }
            entered += 1;
        }

        let result = match rejected {
            Some(err) => Err(err),
            None => run().await,
        };

        let outcome = Outcome {
            result: result.as_ref().map(ItemCount::item_count),
            elapsed: started.elapsed(),
        };
        for interceptor in self.interceptors[..entered].iter().rev() {
            interceptor.after(invocation, &outcome);
        }

        result
    }
}

fn event(
    point: ExtensionPoint,
    endpoint: Endpoint,
    context: &RequestContext,
    media: &[&Media],
) -> HookEvent {
    HookEvent {
        point,
        endpoint,
        slug: context.slug().map(str::to_string),
        media_ids: media.iter().map(|m| m.id).collect::<Vec<MediaId>>(),
    }
}
