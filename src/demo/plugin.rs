//! Example plugin: exports its own callbacks, registers `{js:*}` placeholders,
//! greets players on join and keeps every sidebar refreshed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use futures::FutureExt;
use placeholder_engine::{
    CancelHandle, PlaceholderCallback, PlaceholderService, Scheduler, Subject,
};
use tracing::{error, info};

use super::world::{PlayerTag, World};

pub const CALLBACK_NAMESPACE: &str = "JSPH";

const WELCOME: &str = "Welcome, {player:name}! Server time: {js:server_time}, \
     greeting: {js:hello:welcome back} {js:actor_pos}, cached time: {js:cached_server_time}";

/// Sidebar lines as `(label, template)`.
const SIDEBAR: [(&str, &str); 6] = [
    ("name", "{player:name}"),
    ("block", "{player:look_block:block_type_name}"),
    ("money", "{player:money}"),
    ("entities", "{server:total_entities}"),
    ("entities w/o drops", "{server:total_entities:exclude_drops}"),
    ("position", "{js:actor_pos}"),
];

fn server_time() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub struct ExamplePlugin {
    service: Arc<PlaceholderService>,
    world: Arc<World>,
}

impl ExamplePlugin {
    /// Export the `JSPH` callbacks and register the plugin's placeholders.
    pub fn load(service: Arc<PlaceholderService>, world: Arc<World>) -> Arc<Self> {
        service.export_callback(
            CALLBACK_NAMESPACE,
            "helloPlayer",
            PlaceholderCallback::subject(|_, param, player| {
                let extra = if param.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", param)
                };
                let name = player
                    .downcast_ref::<PlayerTag>()
                    .map_or("unknown player", |tag| tag.name.as_str());
                Ok(format!("Hello, {}{}", name, extra))
            }),
        );

        service.export_callback(
            CALLBACK_NAMESPACE,
            "serverTime",
            PlaceholderCallback::server(|_, _| Ok(format!("server time {}", server_time()))),
        );

        let w = Arc::clone(&world);
        service.export_callback(
            CALLBACK_NAMESPACE,
            "actorPos",
            PlaceholderCallback::subject(move |_, _, actor| {
                Ok(match w.player(actor.id()) {
                    Some(state) => format!(
                        "position ({:.1}, {:.1}, {:.1})",
                        state.pos.x, state.pos.y, state.pos.z
                    ),
                    None => "no actor".to_string(),
                })
            }),
        );

        service.export_callback(
            CALLBACK_NAMESPACE,
            "cachedServerTime",
            PlaceholderCallback::server(|_, _| Ok(format!("cached server time {}", server_time()))),
        );

        let ok1 = service.register_player_placeholder("js", "hello", CALLBACK_NAMESPACE, "helloPlayer", 0);
        let ok2 = service.register_server_placeholder("js", "server_time", CALLBACK_NAMESPACE, "serverTime", 0);
        let ok3 = service.register_actor_placeholder("js", "actor_pos", CALLBACK_NAMESPACE, "actorPos", 5);
        let ok4 = service.register_server_placeholder(
            "js",
            "cached_server_time",
            CALLBACK_NAMESPACE,
            "cachedServerTime",
            5,
        );

        info!("ok1: {}, ok2: {}, ok3: {}, ok4: {}", ok1, ok2, ok3, ok4);
        if ok1 && ok2 && ok3 && ok4 {
            info!("Registered {{js:hello}} / {{js:server_time}} / {{js:actor_pos}} / {{js:cached_server_time}}");
        } else {
            error!("Failed to register plugin placeholders, see the log above");
        }

        Arc::new(Self { service, world })
    }

    /// Resolve the welcome message and "tell" it to the player.
    pub async fn on_join(&self, player: &Subject) -> String {
        let message = self.service.replace_for_player(WELCOME, player).await;
        info!("Told {}: {}", player.id(), message);
        self.update(player).await;
        message
    }

    /// Resolve and log the player's sidebar.
    pub async fn update(&self, player: &Subject) -> Vec<String> {
        let templates = SIDEBAR.map(|(_, template)| template);
        let lines = self.service.replace_many_for_player(&templates, player).await;

        for ((label, _), line) in SIDEBAR.iter().zip(&lines) {
            info!("[sidebar {}] {}: {}", player.id(), label, line);
        }
        lines
    }

    /// Refresh every online player's sidebar on `interval`.
    pub fn schedule_refresh(
        self: &Arc<Self>,
        scheduler: &impl Scheduler,
        interval: Duration,
    ) -> CancelHandle {
        let plugin = Arc::clone(self);
        scheduler.schedule_periodic(
            interval,
            Box::new(move || {
                let plugin = Arc::clone(&plugin);
                async move {
                    plugin.world.step();
                    for player in plugin.world.online_players() {
                        plugin.update(&player).await;
                    }
                }
                .boxed()
            }),
        )
    }

    /// Drop the plugin's placeholders and callbacks.
    pub fn unload(&self) -> bool {
        let ok = self
            .service
            .unregister_by_callback_namespace(CALLBACK_NAMESPACE);
        self.service.unexport_namespace(CALLBACK_NAMESPACE);
        info!("Unloaded placeholders of '{}': {}", CALLBACK_NAMESPACE, ok);
        ok
    }
}

#[cfg(test)]
mod tests {
    use placeholder_engine::{EngineConfig, TokioScheduler};

    use super::*;
    use crate::demo::host;

    fn setup() -> (Arc<PlaceholderService>, Arc<World>, Arc<ExamplePlugin>) {
        let service = Arc::new(PlaceholderService::new(EngineConfig::default()));
        let world = Arc::new(World::sample());
        host::register_builtins(&service, &world).unwrap();
        let plugin = ExamplePlugin::load(Arc::clone(&service), Arc::clone(&world));
        (service, world, plugin)
    }

    #[tokio::test]
    async fn test_plugin_placeholders() {
        let (service, world, _plugin) = setup();
        let alice = &world.online_players()[0];

        assert_eq!(service.replace_for_player("{js:hello}", alice).await, "Hello, Alice");
        assert_eq!(
            service.replace_for_player("{js:hello:hi there}", alice).await,
            "Hello, Alice (hi there)"
        );
        assert_eq!(
            service.replace_for_player("{js:actor_pos}", alice).await,
            "position (1.0, 64.0, -3.5)"
        );
        assert!(service.replace("{js:server_time}").await.starts_with("server time "));
    }

    #[tokio::test]
    async fn test_actor_pos_is_cached() {
        let (service, world, _plugin) = setup();
        let alice = &world.online_players()[0];

        let before = service.replace_for_player("{js:actor_pos}", alice).await;
        world.step();
        let after = service.replace_for_player("{js:actor_pos}", alice).await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_on_join_and_update() {
        let (_service, world, plugin) = setup();
        let bob = &world.online_players()[1];

        let message = plugin.on_join(bob).await;
        assert!(message.starts_with("Welcome, Bob! Server time: server time "));
        assert!(message.contains("Hello, Bob (welcome back)"));

        let lines = plugin.update(bob).await;
        assert_eq!(lines[0], "Bob");
        assert_eq!(lines[1], "none");
        assert_eq!(lines[2], "40");
        assert_eq!(lines[5], "position (-120.0, 70.0, 33.0)");
    }

    #[tokio::test]
    async fn test_unload() {
        let (service, world, plugin) = setup();
        let alice = &world.online_players()[0];

        assert!(plugin.unload());
        assert!(!plugin.unload());
        assert_eq!(service.replace_for_player("{js:hello}", alice).await, "{js:hello}");
        assert_eq!(service.replace_for_player("{player:name}", alice).await, "Alice");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_steps_world() {
        let (_service, world, plugin) = setup();

        let handle = plugin.schedule_refresh(&TokioScheduler::new(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.cancel();

        assert_eq!(world.player("p-1").unwrap().pos.x, 2.5);
    }
}
