//! First-match routing of messages and inline events.

use crate::{ChosenInlineResult, EventContext, Handler, InlineQuery, Message, MessageMiddleware, Next, Outcome};
use algebrach_error::{AlgebrachResult, ConfigError};
use std::sync::Arc;
use tracing::debug;

/// Predicate a message must satisfy for a route to fire.
#[derive(Clone)]
pub enum Filter {
    /// Sent in this chat
    ChatIs(i64),
    /// Sent anywhere but this chat
    ChatIsNot(i64),
    /// Sent by this user
    FromUser(i64),
    /// Replies to another message
    HasReply,
    /// Passes with the given probability in percent
    Chance(f64),
    /// Arbitrary predicate
    Custom(Arc<dyn Fn(&Message) -> bool + Send + Sync>),
}

impl Filter {
    /// Random gate passing `percent` of the time.
    ///
    /// # Examples
    ///
    /// ```
    /// use algebrach_social::Filter;
    ///
    /// assert!(Filter::chance(33.0).is_ok());
    /// assert!(Filter::chance(120.0).is_err());
    /// ```
    pub fn chance(percent: f64) -> Result<Self, ConfigError> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(ConfigError::new(format!(
                "percent should be between 0 and 100, not {}",
                percent
            )));
        }
        Ok(Filter::Chance(percent))
    }

    /// Predicate filter.
    pub fn custom(predicate: impl Fn(&Message) -> bool + Send + Sync + 'static) -> Self {
        Filter::Custom(Arc::new(predicate))
    }

    fn matches(&self, message: &Message) -> bool {
        match self {
            Filter::ChatIs(id) => message.chat.id == *id,
            Filter::ChatIsNot(id) => message.chat.id != *id,
            Filter::FromUser(id) => message.from_user.as_ref().is_some_and(|user| user.id == *id),
            Filter::HasReply => message.reply_to_message.is_some(),
            Filter::Chance(percent) => rand::random::<f64>() < percent / 100.0,
            Filter::Custom(predicate) => predicate(message),
        }
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::ChatIs(id) => write!(f, "ChatIs({})", id),
            Filter::ChatIsNot(id) => write!(f, "ChatIsNot({})", id),
            Filter::FromUser(id) => write!(f, "FromUser({})", id),
            Filter::HasReply => write!(f, "HasReply"),
            Filter::Chance(percent) => write!(f, "Chance({})", percent),
            Filter::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Name and `@mention` of a `/command@bot args` message.
///
/// # Examples
///
/// ```
/// use algebrach_social::parse_command;
///
/// assert_eq!(parse_command("/kek"), Some(("kek", None)));
/// assert_eq!(parse_command("/kek@algebrach_bot please"), Some(("kek", Some("algebrach_bot"))));
/// assert_eq!(parse_command("kek"), None);
/// ```
pub fn parse_command(text: &str) -> Option<(&str, Option<&str>)> {
    let token = text.split_whitespace().next()?;
    let body = token.strip_prefix('/')?;
    let (name, mention) = match body.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (body, None),
    };
    if name.is_empty() {
        return None;
    }
    Some((name, mention))
}

/// A command plus filters, bound to a handler.
#[derive(Clone)]
pub struct Route {
    command: String,
    filters: Vec<Filter>,
    handler: Arc<dyn Handler<Message>>,
}

impl Route {
    /// Route `/command` to `handler`.
    pub fn command(command: impl Into<String>, handler: Arc<dyn Handler<Message>>) -> Self {
        Self {
            command: command.into(),
            filters: Vec::new(),
            handler,
        }
    }

    /// Require `filter` as well. Filters are checked in the order added.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// The command name without the slash.
    pub fn name(&self) -> &str {
        &self.command
    }

    fn matches(&self, message: &Message, bot_username: Option<&str>) -> bool {
        let Some((name, mention)) = message.text_or_caption().and_then(parse_command) else {
            return false;
        };
        if !name.eq_ignore_ascii_case(&self.command) {
            return false;
        }
        if let (Some(mention), Some(bot)) = (mention, bot_username)
            && !mention.eq_ignore_ascii_case(bot)
        {
            return false;
        }
        self.filters.iter().all(|filter| filter.matches(message))
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("command", &self.command)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

/// Which inline queries a handler takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFilter {
    /// Empty query text
    Empty,
    /// Any non-empty query text
    NonEmpty,
    /// Every query
    Any,
}

impl QueryFilter {
    fn matches(&self, query: &InlineQuery) -> bool {
        match self {
            QueryFilter::Empty => query.query.is_empty(),
            QueryFilter::NonEmpty => !query.query.is_empty(),
            QueryFilter::Any => true,
        }
    }
}

/// Ordered handlers for one group of commands, sharing message middlewares.
///
/// Within a router the first matching route wins. Middlewares run only
/// after a route matched, outermost first.
///
/// # Examples
///
/// ```
/// use algebrach_social::{Filter, Route, Router, ThrottleUsers};
/// # use algebrach_social::{EventContext, Handler, Message};
/// # use std::sync::Arc;
/// # struct Kek;
/// # #[async_trait::async_trait]
/// # impl Handler<Message> for Kek {
/// #     async fn handle(&self, _: &Message, _: &EventContext) -> algebrach_error::AlgebrachResult<()> { Ok(()) }
/// # }
///
/// let kek: Arc<dyn Handler<Message>> = Arc::new(Kek);
/// let router = Router::new("kek")
///     .message_middleware(ThrottleUsers::new())
///     .route(Route::command("kek", kek.clone()).filter(Filter::ChatIs(-100)))
///     .route(Route::command("kek", kek));
/// assert_eq!(router.routes().len(), 2);
/// ```
#[derive(Default)]
pub struct Router {
    name: String,
    routes: Vec<Route>,
    middlewares: Vec<Arc<dyn MessageMiddleware>>,
    inline_queries: Vec<(QueryFilter, Arc<dyn Handler<InlineQuery>>)>,
    chosen_inline_results: Vec<Arc<dyn Handler<ChosenInlineResult>>>,
}

impl Router {
    /// An empty router.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Router name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered message routes, in match order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Wrap every message route in `middleware`.
    pub fn message_middleware(mut self, middleware: impl MessageMiddleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Add a message route after the existing ones.
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Handle inline queries passing `filter`.
    pub fn inline_query(mut self, filter: QueryFilter, handler: Arc<dyn Handler<InlineQuery>>) -> Self {
        self.inline_queries.push((filter, handler));
        self
    }

    /// Handle chosen inline results.
    pub fn chosen_inline_result(mut self, handler: Arc<dyn Handler<ChosenInlineResult>>) -> Self {
        self.chosen_inline_results.push(handler);
        self
    }

    /// Run the first route matching `message` through the middlewares.
    pub async fn dispatch_message(
        &self,
        message: &Message,
        ctx: &EventContext,
        bot_username: Option<&str>,
    ) -> AlgebrachResult<Outcome> {
        let Some(route) = self.routes.iter().find(|route| route.matches(message, bot_username)) else {
            return Ok(Outcome::Unhandled);
        };

        debug!(router = %self.name, command = %route.command, "Route matched");
        Next::new(&self.middlewares, route.handler.as_ref())
            .run(message, ctx)
            .await
    }

    /// Run the first inline query handler whose filter passes.
    pub async fn dispatch_inline_query(&self, query: &InlineQuery, ctx: &EventContext) -> AlgebrachResult<Outcome> {
        let Some((_, handler)) = self.inline_queries.iter().find(|(filter, _)| filter.matches(query)) else {
            return Ok(Outcome::Unhandled);
        };
        handler.handle(query, ctx).await?;
        Ok(Outcome::Handled)
    }

    /// Run the first chosen inline result handler.
    pub async fn dispatch_chosen_inline_result(
        &self,
        chosen: &ChosenInlineResult,
        ctx: &EventContext,
    ) -> AlgebrachResult<Outcome> {
        let Some(handler) = self.chosen_inline_results.first() else {
            return Ok(Outcome::Unhandled);
        };
        handler.handle(chosen, ctx).await?;
        Ok(Outcome::Handled)
    }
}
