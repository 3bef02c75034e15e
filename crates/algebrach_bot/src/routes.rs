//! Router assembly.

use crate::handlers::{
    ChosenRandomKek, Help, InlineRandomKek, InlineSearch, Kek, KekAdd, KekAddElsewhere, KekAddNoReply,
    KekInfo, KekPush, Start, SurpriseKek,
};
use crate::Settings;
use algebrach_error::ConfigError;
use algebrach_social::{ChatApi, Dispatcher, Filter, QueryFilter, Route, Router, SkipAnonymous, ThrottleUsers};
use algebrach_storage::KekStorage;
use std::sync::Arc;

/// `/start` and `/help`, without middlewares.
pub fn basic_router() -> Router {
    Router::new("basic")
        .route(Route::command("start", Arc::new(Start)))
        .route(Route::command("help", Arc::new(Help)))
}

/// Kek commands behind the anonymous filter and the per-user throttle.
///
/// Route order matters: the surprise must shadow `/kek` in the main chat,
/// and the reply-less `/kek_add` fallback must come after the reply route.
pub fn kek_router(settings: &Settings, storage: Arc<KekStorage>) -> Result<Router, ConfigError> {
    let main_chat = settings.mechmath_chat_id;
    let kek = Arc::new(Kek::new(storage.clone(), settings.is_prod()));
    let surprise = SurpriseKek::new(kek.clone(), settings.admin_ids.clone(), &settings.surprise_gif);

    Ok(Router::new("kek")
        .message_middleware(SkipAnonymous::default())
        .message_middleware(ThrottleUsers::new())
        .route(
            Route::command("kek", Arc::new(surprise))
                .filter(Filter::ChatIs(main_chat))
                .filter(Filter::chance(settings.surprise_chance)?),
        )
        .route(Route::command("kek", kek))
        .route(Route::command("kek_add", Arc::new(KekAddElsewhere)).filter(Filter::ChatIsNot(main_chat)))
        .route(
            Route::command("kek_add", Arc::new(KekAdd::new(storage.clone())))
                .filter(Filter::ChatIs(main_chat))
                .filter(Filter::HasReply),
        )
        .route(
            Route::command("kek_push", Arc::new(KekPush::new(storage.clone())))
                .filter(Filter::FromUser(settings.rmbk_id))
                .filter(Filter::HasReply),
        )
        .route(Route::command("kek_add", Arc::new(KekAddNoReply)).filter(Filter::ChatIs(main_chat)))
        .route(Route::command("kek_info", Arc::new(KekInfo::new(storage)))))
}

/// Inline search and random kek.
pub fn inline_router(storage: Arc<KekStorage>) -> Router {
    Router::new("kek_inline")
        .inline_query(QueryFilter::Empty, Arc::new(InlineRandomKek))
        .inline_query(QueryFilter::NonEmpty, Arc::new(InlineSearch::new(storage.clone())))
        .chosen_inline_result(Arc::new(ChosenRandomKek::new(storage)))
}

/// The bot's dispatcher with every router included.
pub fn build_dispatcher(
    settings: &Settings,
    api: Arc<dyn ChatApi>,
    storage: Arc<KekStorage>,
) -> Result<Dispatcher, ConfigError> {
    Ok(Dispatcher::new(api)
        .include_router(basic_router())
        .include_router(kek_router(settings, storage.clone())?)
        .include_router(inline_router(storage))
        .with_events_chat_id(settings.events_chat_id))
}
