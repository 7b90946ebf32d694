use std::sync::Arc;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tracing::{error, info};

use session_feed::adapters::ReqwestHttpClient;
use session_feed::api::AgentApiClient;
use session_feed::cache::SessionCache;
use session_feed::cli::{handle_version_command, parse_args, CliCommand};
use session_feed::startup::{init_logging, FeedConfig};
use session_feed::stream::{StreamManager, StreamScope};
use session_feed::sync::ConversationSync;

fn main() -> Result<()> {
    // Handle --version before any initialization
    let args = match parse_args(std::env::args())? {
        CliCommand::Version => handle_version_command(),
        CliCommand::Run(args) => args,
    };

    color_eyre::install()?;
    init_logging();

    let config = args.apply(FeedConfig::from_env().wrap_err("Invalid SESSION_FEED_* configuration")?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(tail_feed(config))
}

/// Follow the feed until Ctrl-C or until the manager gives up.
async fn tail_feed(config: FeedConfig) -> Result<()> {
    let http = ReqwestHttpClient::new();
    let api = Arc::new(AgentApiClient::new(http.clone(), config.base_url.clone()));

    let mut scope = StreamScope::new(api.event_url(config.workspace.as_deref()));
    scope.workspace = config.workspace.clone();
    scope.session_id = config.session.clone();

    info!(
        "Following {} (workspace {:?}, session {:?})",
        scope.url, scope.workspace, scope.session_id
    );

    let stream = StreamManager::spawn(Arc::new(http), scope, config.stream.clone());
    stream.connect();

    let url_api = api.clone();
    let mut sync = ConversationSync::new(stream, api, move |workspace| url_api.event_url(workspace));

    if config.session.is_some() {
        if let Err(e) = sync.refetch().await {
            error!("Initial refetch failed: {}", e.user_message());
        }
        print_cache(sync.cache());
    }

    // Aborting the task drops the stream handle, which stops the manager
    let mut follow = tokio::spawn(async move { sync.follow(print_cache).await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            follow.abort();
            Ok(())
        }
        joined = &mut follow => match joined? {
            Ok(()) => Ok(()),
            Err(e) => Err(eyre!("Gave up on the event feed: {}", e.user_message())),
        },
    }
}

fn print_cache(cache: &SessionCache) {
    println!(
        "--- session {} ({} message(s), {:?})",
        cache.scope().unwrap_or("*"),
        cache.len(),
        cache.activity()
    );
    for entry in cache.entries() {
        println!(
            "{:>9} {} [{} part(s)] {}",
            format!("{:?}", entry.info.role),
            entry.id(),
            entry.parts.len(),
            entry.text()
        );
    }
}
