//! The composition root wiring events to components.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use tracing::{debug, info};

use tether_config::Config;
use tether_events::{EventBus, Subscription};
use tether_party::{Outbound, PartyCoordinator, announce_player};
use tether_protocol::{
    AcceptInviteRequest, ChangeLeaderRequest, ClientMessage, CreatePartyRequest, InviteRequest,
    KickRequest, LeavePartyRequest, PlayerId, ServerMessage, Tick, TimeSettings,
};
use tether_world::{
    EntityDirectory, ObjectModel, ReferenceActivated, ReferenceDeactivated, WorldStore,
};

use crate::events::{PlayerJoined, PlayerLeft, Request, TickEvent};
use crate::outbound::ChannelOutbound;
use crate::players::{JoinError, Player, PlayerDirectory};

/// Owns the bus, the world store, the entity directory, the party
/// coordinator, and the player directory, and subscribes each component to
/// the events it consumes. Everything runs on one logical execution context;
/// construction takes explicit collaborators, never globals.
pub struct SyncServer {
    bus: EventBus,
    store: Rc<RefCell<WorldStore>>,
    directory: Rc<RefCell<EntityDirectory>>,
    coordinator: Rc<RefCell<PartyCoordinator>>,
    players: Rc<RefCell<PlayerDirectory>>,
    clock: Rc<Cell<Tick>>,
    // Dropped with the server, unsubscribing every handler.
    _subscriptions: Vec<Subscription>,
}

impl SyncServer {
    /// Builds the server and wires every event kind to its owning component.
    pub fn new(config: &Config, outbound: ChannelOutbound, model: Box<dyn ObjectModel>) -> Self {
        let bus = EventBus::new();
        let store = Rc::new(RefCell::new(WorldStore::new()));
        let directory = Rc::new(RefCell::new(EntityDirectory::new()));
        let coordinator = Rc::new(RefCell::new(PartyCoordinator::new()));
        let players = Rc::new(RefCell::new(PlayerDirectory::new(config.server.max_players)));
        let clock = Rc::new(Cell::new(0));
        let model = Rc::new(RefCell::new(model));

        let mut subscriptions = Vec::new();

        // --- Entity directory ---

        subscriptions.push(bus.subscribe({
            let store = Rc::clone(&store);
            let directory = Rc::clone(&directory);
            let model = Rc::clone(&model);
            let bus = bus.clone();
            move |ev: &ReferenceActivated| {
                let spawned = {
                    let mut store = store.borrow_mut();
                    let mut model = model.borrow_mut();
                    directory
                        .borrow_mut()
                        .activate(&mut store, model.as_mut(), ev.ref_id, ev.kind)
                };
                // Publish after every borrow is released so downstream
                // consumers may freely read the directory and store.
                if let Some(spawned) = spawned {
                    bus.publish(&spawned);
                }
            }
        }));

        subscriptions.push(bus.subscribe({
            let store = Rc::clone(&store);
            let directory = Rc::clone(&directory);
            move |ev: &ReferenceDeactivated| {
                directory
                    .borrow_mut()
                    .deactivate(&mut store.borrow_mut(), ev.ref_id);
            }
        }));

        // --- Session events ---

        subscriptions.push(bus.subscribe({
            let players = Rc::clone(&players);
            let outbound = outbound.clone();
            let world_time = config.world_time.clone();
            move |ev: &PlayerJoined| {
                let players = players.borrow();
                announce_player(
                    &*players,
                    &outbound,
                    ev.player_id,
                    ev.world_space_id,
                    ev.cell_id,
                );
                outbound.send(
                    ev.player_id,
                    ServerMessage::TimeSettings(TimeSettings {
                        time_scale: world_time.time_scale,
                        hour: world_time.hour,
                        day: world_time.day,
                        month: world_time.month,
                        year: world_time.year,
                    }),
                );
            }
        }));

        subscriptions.push(bus.subscribe({
            let players = Rc::clone(&players);
            let coordinator = Rc::clone(&coordinator);
            let outbound = outbound.clone();
            move |ev: &PlayerLeft| {
                coordinator
                    .borrow_mut()
                    .on_player_left(&*players.borrow(), &outbound, ev.player_id);
            }
        }));

        subscriptions.push(bus.subscribe({
            let coordinator = Rc::clone(&coordinator);
            let clock = Rc::clone(&clock);
            move |ev: &TickEvent| {
                clock.set(ev.current_tick);
                coordinator.borrow_mut().sweep_invitations(ev.current_tick);
            }
        }));

        // --- Party requests ---
        // Rejections are already logged by the coordinator; the wiring only
        // has to keep them off the wire, which `Result` makes free.

        subscriptions.push(bus.subscribe({
            let players = Rc::clone(&players);
            let coordinator = Rc::clone(&coordinator);
            let outbound = outbound.clone();
            move |ev: &Request<CreatePartyRequest>| {
                let _ = coordinator
                    .borrow_mut()
                    .create_party(&*players.borrow(), &outbound, ev.sender);
            }
        }));

        subscriptions.push(bus.subscribe({
            let players = Rc::clone(&players);
            let coordinator = Rc::clone(&coordinator);
            let outbound = outbound.clone();
            let clock = Rc::clone(&clock);
            move |ev: &Request<InviteRequest>| {
                let _ = coordinator.borrow_mut().invite(
                    &*players.borrow(),
                    &outbound,
                    ev.sender,
                    ev.payload.target_player_id,
                    clock.get(),
                );
            }
        }));

        subscriptions.push(bus.subscribe({
            let players = Rc::clone(&players);
            let coordinator = Rc::clone(&coordinator);
            let outbound = outbound.clone();
            move |ev: &Request<AcceptInviteRequest>| {
                let _ = coordinator.borrow_mut().accept_invite(
                    &*players.borrow(),
                    &outbound,
                    ev.sender,
                    ev.payload.inviter_id,
                );
            }
        }));

        subscriptions.push(bus.subscribe({
            let coordinator = Rc::clone(&coordinator);
            let outbound = outbound.clone();
            move |ev: &Request<LeavePartyRequest>| {
                let _ = coordinator.borrow_mut().leave(&outbound, ev.sender);
            }
        }));

        subscriptions.push(bus.subscribe({
            let players = Rc::clone(&players);
            let coordinator = Rc::clone(&coordinator);
            let outbound = outbound.clone();
            move |ev: &Request<ChangeLeaderRequest>| {
                let _ = coordinator.borrow_mut().change_leader(
                    &*players.borrow(),
                    &outbound,
                    ev.sender,
                    ev.payload.target_player_id,
                );
            }
        }));

        subscriptions.push(bus.subscribe({
            let players = Rc::clone(&players);
            let coordinator = Rc::clone(&coordinator);
            let outbound = outbound.clone();
            move |ev: &Request<KickRequest>| {
                let _ = coordinator.borrow_mut().kick(
                    &*players.borrow(),
                    &outbound,
                    ev.sender,
                    ev.payload.target_player_id,
                );
            }
        }));

        info!(
            "sync server ready (max {} players, tick rate {} Hz)",
            config.server.max_players, config.server.tick_rate
        );

        Self {
            bus,
            store,
            directory,
            coordinator,
            players,
            clock,
            _subscriptions: subscriptions,
        }
    }

    // -----------------------------------------------------------------------
    // Boundary entry points
    // -----------------------------------------------------------------------

    /// Admits a player and announces them to the world.
    pub fn connect_player(
        &self,
        player: Player,
        world_space_id: u32,
        cell_id: u32,
    ) -> Result<(), JoinError> {
        let player_id = player.id;
        self.players.borrow_mut().insert(player)?;
        debug!("player {player_id} connected");
        self.bus.publish(&PlayerJoined {
            player_id,
            world_space_id,
            cell_id,
        });
        Ok(())
    }

    /// Removes a player. Handlers see the leaver still in the directory and
    /// exclude them explicitly; the record is dropped afterward.
    pub fn disconnect_player(&self, player_id: PlayerId) {
        self.bus.publish(&PlayerLeft { player_id });
        if self.players.borrow_mut().remove(player_id).is_some() {
            debug!("player {player_id} disconnected");
        }
    }

    /// Publishes a decoded client request as its typed event.
    pub fn handle_client_message(&self, sender: PlayerId, msg: ClientMessage) {
        match msg {
            ClientMessage::CreateParty(payload) => {
                self.bus.publish(&Request { sender, payload });
            }
            ClientMessage::Invite(payload) => self.bus.publish(&Request { sender, payload }),
            ClientMessage::AcceptInvite(payload) => self.bus.publish(&Request { sender, payload }),
            ClientMessage::LeaveParty(payload) => self.bus.publish(&Request { sender, payload }),
            ClientMessage::ChangeLeader(payload) => self.bus.publish(&Request { sender, payload }),
            ClientMessage::Kick(payload) => self.bus.publish(&Request { sender, payload }),
        }
    }

    /// Advances the server clock by one tick and publishes the tick event.
    pub fn advance_tick(&self) -> Tick {
        let next = self.clock.get() + 1;
        self.bus.publish(&TickEvent { current_tick: next });
        next
    }

    /// The current server tick.
    pub fn current_tick(&self) -> Tick {
        self.clock.get()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The event bus; the engine and transport boundaries publish into it.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Read access to the world store.
    pub fn store(&self) -> Ref<'_, WorldStore> {
        self.store.borrow()
    }

    /// Read access to the entity directory.
    pub fn directory(&self) -> Ref<'_, EntityDirectory> {
        self.directory.borrow()
    }

    /// Read access to the party coordinator.
    pub fn coordinator(&self) -> Ref<'_, PartyCoordinator> {
        self.coordinator.borrow()
    }

    /// Read access to the player directory.
    pub fn players(&self) -> Ref<'_, PlayerDirectory> {
        self.players.borrow()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
