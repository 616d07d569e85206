//! The host's built-in placeholders.

use std::sync::Arc;

use placeholder_engine::{
    CallbackRef, ContextKind, PlaceholderCallback, PlaceholderService, Registration, Subject,
};
use tracing::info;

use super::world::{PlayerState, World};

pub const CALLBACK_NAMESPACE: &str = "HOST";

fn online_player(world: &World, subject: &Subject) -> anyhow::Result<PlayerState> {
    world
        .player(subject.id())
        .ok_or_else(|| anyhow::anyhow!("{} is not online", subject.id()))
}

/// Export the host callbacks and register `{player:name}`, `{player:money}`,
/// `{player:look_block:<field>}` and `{server:total_entities}`.
pub fn register_builtins(service: &PlaceholderService, world: &Arc<World>) -> anyhow::Result<()> {
    let w = Arc::clone(world);
    service.export_callback(
        CALLBACK_NAMESPACE,
        "playerName",
        PlaceholderCallback::subject(move |_, _, subject| Ok(online_player(&w, subject)?.name)),
    );

    let w = Arc::clone(world);
    service.export_callback(
        CALLBACK_NAMESPACE,
        "playerMoney",
        PlaceholderCallback::subject(move |_, _, subject| {
            Ok(online_player(&w, subject)?.money.to_string())
        }),
    );

    let w = Arc::clone(world);
    service.export_callback(
        CALLBACK_NAMESPACE,
        "lookBlock",
        PlaceholderCallback::subject(move |_, field, subject| {
            let Some(block) = online_player(&w, subject)?.look_block else {
                return Ok("none".to_string());
            };
            match field {
                "" | "block_type_name" => Ok(block.type_name),
                "name" => Ok(block.name),
                "pos" => Ok(format!("{}, {}, {}", block.pos.0, block.pos.1, block.pos.2)),
                other => anyhow::bail!("unknown block field '{}'", other),
            }
        }),
    );

    let w = Arc::clone(world);
    service.export_callback(
        CALLBACK_NAMESPACE,
        "totalEntities",
        PlaceholderCallback::server(move |_, param| {
            Ok(w.total_entities(param == "exclude_drops").to_string())
        }),
    );

    let builtins = [
        (ContextKind::Player, "player", "name", "playerName"),
        (ContextKind::Player, "player", "money", "playerMoney"),
        (ContextKind::Player, "player", "look_block", "lookBlock"),
        (ContextKind::Server, "server", "total_entities", "totalEntities"),
    ];
    for (kind, namespace, token, callback) in builtins {
        service.register(Registration::new(
            kind,
            namespace,
            token,
            CallbackRef::new(CALLBACK_NAMESPACE, callback),
        ))?;
    }

    info!("Registered {} built-in placeholders", builtins.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use placeholder_engine::EngineConfig;

    use super::*;

    fn setup() -> (PlaceholderService, Arc<World>) {
        let service = PlaceholderService::new(EngineConfig::default());
        let world = Arc::new(World::sample());
        register_builtins(&service, &world).unwrap();
        (service, world)
    }

    #[tokio::test]
    async fn test_player_builtins() {
        let (service, world) = setup();
        let alice = &world.online_players()[0];

        let out = service
            .replace_for_player("{player:name} has {player:money}", alice)
            .await;
        assert_eq!(out, "Alice has 250");
    }

    #[tokio::test]
    async fn test_look_block_fields() {
        let (service, world) = setup();
        let online = world.online_players();
        let (alice, bob) = (&online[0], &online[1]);

        assert_eq!(
            service.replace_for_player("{player:look_block:block_type_name}", alice).await,
            "minecraft:oak_log"
        );
        assert_eq!(
            service.replace_for_player("{player:look_block:pos}", alice).await,
            "2, 64, -3"
        );
        assert_eq!(service.replace_for_player("{player:look_block}", bob).await, "none");
        assert_eq!(
            service.replace_for_player("{player:look_block:color}", alice).await,
            "{player:look_block:color}"
        );
    }

    #[tokio::test]
    async fn test_total_entities() {
        let (service, _world) = setup();

        let out = service
            .replace("{server:total_entities} / {server:total_entities:exclude_drops}")
            .await;
        assert_eq!(out, "17 / 14");
    }

    #[test]
    fn test_builtins_cannot_register_twice() {
        let (service, world) = setup();
        assert!(register_builtins(&service, &world).is_err());
    }
}
