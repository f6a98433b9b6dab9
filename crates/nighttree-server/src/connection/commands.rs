//! Chat and slash commands.

use nighttree_command::{builtin, CommandError, CommandLine, CommandResult, Issuer};
use nighttree_game::GIVE_MAX;
use nighttree_proto::BlockKind;

use crate::permissions::Punishment;
use crate::persistence::SPAWN;

use super::*;

type Outcome = Result<CommandResult, CommandError>;

fn usage(name: &str) -> &'static str {
    builtin(name).map(|c| c.usage).unwrap_or("")
}

impl ConnectionHandler {
    pub(super) fn handle_chat(&mut self, conn_id: ConnectionId, id: &str, message: String) {
        if self.permissions.is_muted(id) {
            self.reply(conn_id, ServerMessage::server_chat("You are muted."));
            return;
        }

        if message.starts_with('/') {
            info!("{id} issued command: {message}");
            let result = self.dispatch_command(&Issuer::Player(id.to_string()), &message);
            self.reply(conn_id, ServerMessage::server_chat(result.text()));
            return;
        }

        info!("<{id}> {message}");
        let level = self.permissions.level(id);
        self.sessions.broadcast(
            &ServerMessage::Chat {
                from: id.to_string(),
                level,
                message,
            },
            None,
        );
    }

    /// Check permission and run a parsed command.
    pub(super) fn execute_command(&mut self, issuer: &Issuer, cmd: &CommandLine) -> CommandResult {
        let Some(required) = self.permissions.commands.required_level(&cmd.name) else {
            return CommandError::NotFound(cmd.name.clone()).into();
        };
        if let Issuer::Player(id) = issuer {
            if self.permissions.level(id) < required {
                return CommandError::PermissionDenied(cmd.name.clone()).into();
            }
        }

        let outcome = match cmd.name.as_str() {
            "kick" => self.cmd_kick(cmd),
            "ban" => self.cmd_ban(cmd),
            "mute" => self.cmd_mute(cmd),
            "unpunish" => self.cmd_unpunish(cmd),
            "perms" => self.cmd_perms(cmd),
            "help" => Ok(self.cmd_help()),
            "respawn" => self.cmd_respawn(issuer),
            "tp" => self.cmd_tp(issuer, cmd),
            "give" => self.cmd_give(issuer, cmd),
            "stop" => Ok(self.cmd_stop()),
            other => Err(CommandError::NotFound(other.to_string())),
        };
        outcome.into()
    }

    fn cmd_kick(&mut self, cmd: &CommandLine) -> Outcome {
        let target = cmd.arg(0, usage("kick"))?;
        if self.kick(target, "Kicked") {
            Ok(CommandResult::ok(format!("Kicked {target}.")))
        } else {
            Err(CommandError::Failed(format!("Player {target} is not online.")))
        }
    }

    fn cmd_ban(&mut self, cmd: &CommandLine) -> Outcome {
        let target = cmd.arg(0, usage("ban"))?;
        self.permissions.punish(target, Punishment::Banned);
        self.kick(target, "You have been banned from this server");
        Ok(CommandResult::ok(format!("Banned {target}.")))
    }

    fn cmd_mute(&mut self, cmd: &CommandLine) -> Outcome {
        let target = cmd.arg(0, usage("mute"))?;
        self.permissions.punish(target, Punishment::Muted);
        Ok(CommandResult::ok(format!("Muted {target}.")))
    }

    fn cmd_unpunish(&mut self, cmd: &CommandLine) -> Outcome {
        let target = cmd.arg(0, usage("unpunish"))?;
        if self.permissions.unpunish(target) {
            Ok(CommandResult::ok(format!("Cleared punishments for {target}.")))
        } else {
            Ok(CommandResult::ok(format!("{target} has no punishments.")))
        }
    }

    fn cmd_perms(&mut self, cmd: &CommandLine) -> Outcome {
        let target = cmd.arg(0, usage("perms"))?;
        let level: i32 = cmd.number(1, "level", usage("perms"))?;
        self.permissions.set_level(target, level);
        Ok(CommandResult::ok(format!(
            "Set {target}'s permission level to {level}."
        )))
    }

    fn cmd_help(&self) -> CommandResult {
        let names: Vec<String> = self
            .permissions
            .commands
            .names()
            .map(|n| format!("/{n}"))
            .collect();
        CommandResult::ok(format!("Available commands: {}", names.join(", ")))
    }

    fn cmd_respawn(&mut self, issuer: &Issuer) -> Outcome {
        let id = issuer.player()?;
        self.move_player(id, SPAWN)?;
        Ok(CommandResult::ok("Respawned at spawn."))
    }

    fn cmd_tp(&mut self, issuer: &Issuer, cmd: &CommandLine) -> Outcome {
        let id = issuer.player()?;
        let target = cmd.arg(0, usage("tp"))?;
        let Some(position) = self.world.players.get(target).map(|r| r.position()) else {
            return Err(CommandError::Failed(format!("Player {target} not found.")));
        };
        self.move_player(id, position)?;
        Ok(CommandResult::ok(format!(
            "Teleported to {target} at ({}, {}).",
            position.0, position.1
        )))
    }

    /// Set a player's stored and live position and tell their client.
    fn move_player(&mut self, id: &str, (x, y): (f64, f64)) -> Result<(), CommandError> {
        let Some(record) = self.world.players.get_mut(id) else {
            return Err(CommandError::Failed(format!("No player record for {id}.")));
        };
        record.set_position((x, y));
        self.world.save_players();
        if let Some(session) = self.sessions.get_mut(id) {
            session.position = (x, y);
        }
        self.sessions.send_to(id, ServerMessage::Respawn { x, y });
        Ok(())
    }

    /// `give <block> <qty>` for the issuer, or `give <player> <block> <qty>`.
    /// Players may only name themselves.
    fn cmd_give(&mut self, issuer: &Issuer, cmd: &CommandLine) -> Outcome {
        let give_usage = usage("give");
        let (recipient, first) = match cmd.args.len() {
            0 | 1 => return Err(CommandError::Usage(give_usage)),
            2 => (issuer.player()?.to_string(), 0),
            _ => (cmd.arg(0, give_usage)?.to_string(), 1),
        };
        if let Issuer::Player(id) = issuer {
            if *id != recipient {
                return Err(CommandError::Failed(
                    "Only the console can give items to other players.".into(),
                ));
            }
        }
        let kind_arg = cmd.arg(first, give_usage)?;
        let quantity: u32 = cmd.number(first + 1, "quantity", give_usage)?;

        if !(1..=GIVE_MAX).contains(&quantity) {
            return Err(CommandError::Failed(format!(
                "Quantity must be between 1 and {GIVE_MAX}."
            )));
        }
        let kind = match kind_arg.parse::<BlockKind>() {
            Ok(kind) if kind.is_item() => kind,
            _ => {
                let valid: Vec<&str> = BlockKind::ALL
                    .iter()
                    .filter(|k| k.is_item())
                    .map(|k| k.name())
                    .collect();
                return Err(CommandError::Failed(format!(
                    "Invalid block '{kind_arg}'. Valid: {}",
                    valid.join(", ")
                )));
            }
        };

        let Some(record) = self.world.players.get_mut(&recipient) else {
            return Err(CommandError::Failed(format!("Player {recipient} not found.")));
        };
        let added = record.items.give_to_hotbar(kind, quantity);
        let hotbar = record.items.hotbar;
        if added > 0 {
            self.world.save_players();
            self.sessions
                .send_to(&recipient, ServerMessage::HotbarUpdate { hotbar });
        }

        let whose = if issuer.id() == recipient {
            "your".to_string()
        } else {
            format!("{recipient}'s")
        };
        if added == quantity {
            Ok(CommandResult::ok(format!(
                "Added {quantity} {kind} to {whose} hotbar."
            )))
        } else {
            Ok(CommandResult::ok(format!(
                "Added {added}/{quantity} {kind}. Hotbar full, {} items couldn't fit.",
                quantity - added
            )))
        }
    }

    fn cmd_stop(&self) -> CommandResult {
        CommandResult::stop("All data saved. Stopping the server.")
    }
}

#[cfg(test)]
mod tests {
    use nighttree_proto::{empty_hotbar, BlockKind, ClientMessage, ItemStack, ServerMessage};

    use crate::connection::testing::{Client, Harness};

    fn chat(message: &str) -> ClientMessage {
        ClientMessage::Chat {
            message: message.into(),
        }
    }

    /// Send a slash command as a player and return the private reply.
    fn run(h: &mut Harness, client: &mut Client, line: &str) -> String {
        client.drain();
        h.send(client, chat(line));
        let replies = client.drain();
        match replies.as_slice() {
            [.., ServerMessage::Chat { from, level, message }] => {
                assert_eq!(from, "SERVER");
                assert_eq!(*level, 999);
                message.clone()
            }
            other => panic!("expected a server reply, got {other:?}"),
        }
    }

    #[test]
    fn chat_is_broadcast_to_everyone() {
        let mut h = Harness::new("chat");
        let mut a = h.login("a");
        let mut b = h.login("b");
        h.handler.permissions.set_level("a", 2);
        a.drain();
        b.drain();

        h.send(&a, chat("hello"));
        let expected = ServerMessage::Chat {
            from: "a".into(),
            level: 2,
            message: "hello".into(),
        };
        assert_eq!(a.drain(), vec![expected.clone()]);
        assert_eq!(b.drain(), vec![expected]);
    }

    #[test]
    fn muted_chat_is_never_broadcast() {
        let mut h = Harness::new("muted");
        let mut a = h.login("a");
        let mut b = h.login("b");
        assert_eq!(h.handler.handle_console_command("/mute a"), "Muted a.");
        a.drain();
        b.drain();

        h.send(&a, chat("hello"));
        h.send(&a, chat("/help"));
        let muted = ServerMessage::server_chat("You are muted.");
        assert_eq!(a.drain(), vec![muted.clone(), muted]);
        assert!(b.drain().is_empty());

        h.handler.handle_console_command("/unpunish a");
        h.send(&a, chat("back"));
        assert_eq!(b.drain().len(), 1);
    }

    #[test]
    fn unknown_command_and_denied_command() {
        let mut h = Harness::new("denied");
        let mut a = h.login("a");
        let reply = run(&mut h, &mut a, "/fly");
        assert!(reply.contains("Unknown command 'fly'"));

        let reply = run(&mut h, &mut a, "/ban b");
        assert!(reply.contains("permission"));
        assert!(!h.handler.permissions.is_banned("b"));

        h.handler.permissions.set_level("a", 2);
        assert_eq!(run(&mut h, &mut a, "/ban b"), "Banned b.");
        assert!(h.handler.permissions.is_banned("b"));
    }

    #[test]
    fn console_bypasses_levels() {
        let mut h = Harness::new("console");
        assert_eq!(h.handler.handle_console_command("/perms a 3"), "Set a's permission level to 3.");
        assert_eq!(h.handler.permissions.level("a"), 3);
        assert!(h
            .handler
            .handle_console_command("hello")
            .starts_with("Commands must start with /"));
    }

    #[test]
    fn usage_and_number_errors() {
        let mut h = Harness::new("usage");
        assert_eq!(
            h.handler.handle_console_command("/kick"),
            "Usage: /kick <player_id>"
        );
        assert_eq!(
            h.handler.handle_console_command("/perms a lots"),
            "'lots' is not a valid level."
        );
        assert_eq!(
            h.handler.handle_console_command("/respawn"),
            "This command cannot be used from console."
        );
        assert_eq!(
            h.handler.handle_console_command("/tp a"),
            "This command cannot be used from console."
        );
    }

    #[test]
    fn help_lists_registered_commands() {
        let mut h = Harness::new("help");
        let mut a = h.login("a");
        let reply = run(&mut h, &mut a, "/help");
        assert!(reply.starts_with("Available commands: "));
        for name in ["/ban", "/give", "/tp", "/stop", "/unpunish"] {
            assert!(reply.contains(name), "{reply}");
        }
    }

    #[test]
    fn kick_sends_reason_and_closes() {
        let mut h = Harness::new("kick");
        let mut a = h.login("a");
        let mut b = h.login("b");
        h.send(&a, ClientMessage::Move { x: 1.0, y: 1.0 });
        a.drain();
        b.drain();

        assert_eq!(h.handler.handle_console_command("/kick a"), "Kicked a.");
        assert_eq!(a.drain(), vec![ServerMessage::disconnect("Kicked")]);
        assert!(a.conn.is_closed());
        assert!(!h.handler.sessions.contains("a"));

        h.close(&a);
        assert_eq!(b.drain(), vec![ServerMessage::PlayerLeave { id: "a".into() }]);

        assert_eq!(
            h.handler.handle_console_command("/kick a"),
            "Player a is not online."
        );
    }

    #[test]
    fn ban_kicks_and_blocks_login() {
        let mut h = Harness::new("ban");
        let mut a = h.login("a");
        a.drain();

        h.handler.handle_console_command("/ban a");
        assert_eq!(
            a.drain(),
            vec![ServerMessage::disconnect("You have been banned from this server")]
        );
        h.close(&a);

        let mut again = h.login("a");
        assert_eq!(
            again.drain(),
            vec![ServerMessage::disconnect("You are banned from this server")]
        );
    }

    #[test]
    fn respawn_resets_position() {
        let mut h = Harness::new("respawn");
        let mut a = h.login("a");
        h.send(&a, ClientMessage::Move { x: 50.0, y: 1.0 });
        let reply = run(&mut h, &mut a, "/respawn");
        assert_eq!(reply, "Respawned at spawn.");
        assert_eq!(h.handler.world.players["a"].position(), (10.0, 3.0));
        assert_eq!(h.handler.sessions.get("a").unwrap().position, (10.0, 3.0));
    }

    #[test]
    fn respawn_pushes_respawn_before_reply() {
        let mut h = Harness::new("respawn_push");
        let mut a = h.login("a");
        a.drain();
        h.send(&a, chat("/respawn"));
        let replies = a.drain();
        assert_eq!(replies[0], ServerMessage::Respawn { x: 10.0, y: 3.0 });
        assert_eq!(replies.len(), 2);
    }

    #[test]
    fn tp_copies_stored_position() {
        let mut h = Harness::new("tp");
        let mut a = h.login("a");
        let b = h.login("b");
        h.send(&b, ClientMessage::Move { x: 42.0, y: 7.5 });
        h.close(&b);

        let reply = run(&mut h, &mut a, "/tp b");
        assert_eq!(reply, "Teleported to b at (42, 7.5).");
        assert_eq!(h.handler.world.players["a"].position(), (42.0, 7.5));

        let reply = run(&mut h, &mut a, "/tp ghost");
        assert_eq!(reply, "Player ghost not found.");
    }

    #[test]
    fn give_to_self() {
        let mut h = Harness::new("give_self");
        let mut a = h.login("a");
        a.drain();
        h.send(&a, chat("/give wood 70"));
        let replies = a.drain();

        let mut hotbar = empty_hotbar();
        hotbar[0] = ItemStack::new(BlockKind::Stone, 10);
        hotbar[1] = ItemStack::new(BlockKind::Wood, 64);
        hotbar[2] = ItemStack::new(BlockKind::Wood, 6);
        assert_eq!(
            replies,
            vec![
                ServerMessage::HotbarUpdate { hotbar },
                ServerMessage::server_chat("Added 70 wood to your hotbar."),
            ]
        );
    }

    #[test]
    fn give_validation() {
        let mut h = Harness::new("give_invalid");
        let mut a = h.login("a");
        assert_eq!(
            run(&mut h, &mut a, "/give wood 0"),
            "Quantity must be between 1 and 999."
        );
        assert_eq!(
            run(&mut h, &mut a, "/give wood 1000"),
            "Quantity must be between 1 and 999."
        );
        assert_eq!(
            run(&mut h, &mut a, "/give wood many"),
            "'many' is not a valid quantity."
        );
        assert_eq!(
            run(&mut h, &mut a, "/give bedrock 1"),
            "Invalid block 'bedrock'. Valid: dirt, grass, stone, sand, wood, ladder"
        );
        assert_eq!(
            run(&mut h, &mut a, "/give wood"),
            "Usage: /give [player_id] <block> <quantity>"
        );
    }

    #[test]
    fn console_give_into_full_hotbar_reports_nothing_added() {
        let mut h = Harness::new("give_full");
        let mut a = h.login("A");
        for slot in h.handler.world.players.get_mut("A").unwrap().items.hotbar.iter_mut() {
            *slot = ItemStack::new(BlockKind::Dirt, 64);
        }
        a.drain();

        let reply = h.handler.handle_console_command("/give A stone 5");
        assert_eq!(
            reply,
            "Added 0/5 stone. Hotbar full, 5 items couldn't fit."
        );
        assert!(a.drain().is_empty());
    }

    #[test]
    fn console_give_to_player() {
        let mut h = Harness::new("give_console");
        let mut a = h.login("A");
        a.drain();

        let reply = h.handler.handle_console_command("/give A stone 5");
        assert_eq!(reply, "Added 5 stone to A's hotbar.");
        let updates = a.drain();
        assert_eq!(updates.len(), 1);
        assert_eq!(
            h.handler.world.players["A"].items.hotbar[0],
            ItemStack::new(BlockKind::Stone, 15)
        );

        assert_eq!(
            h.handler.handle_console_command("/give stone 5"),
            "This command cannot be used from console."
        );
    }

    #[test]
    fn player_cannot_give_to_another_player() {
        let mut h = Harness::new("give_other");
        let mut a = h.login("a");
        let mut b = h.login("b");
        b.drain();

        assert_eq!(
            run(&mut h, &mut a, "/give b wood 5"),
            "Only the console can give items to other players."
        );
        assert!(b.drain().is_empty());
        assert_eq!(h.handler.world.players["b"].items.hotbar[1], None);

        assert_eq!(
            run(&mut h, &mut a, "/give a wood 5"),
            "Added 5 wood to your hotbar."
        );
    }

    #[test]
    fn console_stop_saves_and_signals_shutdown() {
        let mut h = Harness::new("stop_console");
        h.handler.world.grid.set(1, 0, BlockKind::Sand);

        let reply = h.handler.handle_console_command("/stop");
        assert_eq!(reply, "All data saved. Stopping the server.");
        assert!(*h.shutdown.borrow());
        let saved = nighttree_world::storage::load_grid(h.handler.world.world_path())
            .unwrap()
            .unwrap();
        assert_eq!(saved.get(1, 0), Some(BlockKind::Sand));
    }

    #[test]
    fn stop_saves_and_signals_shutdown() {
        let mut h = Harness::new("stop");
        let mut a = h.login("a");
        h.handler.permissions.set_level("a", 3);
        h.handler.world.grid.set(0, 0, BlockKind::Wood);

        let reply = run(&mut h, &mut a, "/stop");
        assert!(reply.contains("Stopping"));
        assert!(*h.shutdown.borrow());

        let saved = nighttree_world::storage::load_grid(h.handler.world.world_path())
            .unwrap()
            .unwrap();
        assert_eq!(saved.get(0, 0), Some(BlockKind::Wood));
    }

    #[test]
    fn stop_requires_level_three() {
        let mut h = Harness::new("stop_denied");
        let mut a = h.login("a");
        h.handler.permissions.set_level("a", 2);
        let reply = run(&mut h, &mut a, "/stop");
        assert!(reply.contains("permission"));
        assert!(!*h.shutdown.borrow());
    }
}
