//! Master and render node driven through the frame hooks, without sockets.

use bytes::Bytes;
use engine::{ClientNode, Config, FrameHooks, MasterNode, SphericalPosition, StartPolicy};
use tokio::sync::mpsc;

struct Harness {
    master: MasterNode,
    client: ClientNode,
    phones: mpsc::UnboundedSender<String>,
    relay: mpsc::UnboundedReceiver<String>,
    now: f32,
}

impl Harness {
    fn new(config: Config) -> Self {
        let (phones, inbox) = mpsc::unbounded_channel();
        let (outbox, relay) = mpsc::unbounded_channel();
        Self {
            master: MasterNode::new(&config, inbox, outbox),
            client: ClientNode::new(&config),
            phones,
            relay,
            now: 0.0,
        }
    }

    fn send(&self, text: &str) {
        self.phones.send(text.to_string()).unwrap();
    }

    /// One frame of the driver, with the master's frame delivered.
    fn frame(&mut self, dt: f32) {
        self.now += dt;
        self.master.pre_sync(self.now);
        self.client.pre_sync(self.now);
        let data = self.master.encode().expect("master produces frames");
        self.master.post_sync();
        self.client.decode(data);
        self.client.post_sync();
    }

    fn relay_messages(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(text) = self.relay.try_recv() {
            out.push(text);
        }
        out
    }
}

fn config() -> Config {
    let mut config = Config::default();
    config.spawn.seed = Some(42);
    config
}

#[test]
fn new_players_reach_the_render_node() {
    let mut h = Harness::new(config());
    h.send("N 0 Alice");
    h.send("N 1 Bob");
    h.frame(0.016);

    let players = h.client.game().players();
    assert_eq!(players.len(), 2);
    assert_eq!(players.get(0).unwrap().name, "Alice");
    assert_eq!(players.get(1).unwrap().name, "Bob");
    assert!(h.client.game().flags().game_started);
    assert_eq!(h.relay_messages().first().map(String::as_str), Some("U start"));

    // Later frames carry the delta shape and keep the replica in step.
    h.send("C 1 0.25");
    h.frame(0.016);
    h.frame(0.016);
    let master_bob = h.master.game().players().get(1).unwrap().clone();
    let client_bob = h.client.game().players().get(1).unwrap();
    assert_eq!(client_bob.turn_speed, 0.25);
    assert_eq!(client_bob.orientation, master_bob.orientation);
    assert!(
        client_bob
            .position
            .quat()
            .abs_diff_eq(master_bob.position.quat(), 1e-6)
    );
}

#[test]
fn turn_command_touches_only_its_player() {
    let mut h = Harness::new(config());
    for id in 0..7 {
        h.send(&format!("N {id} p{id}"));
    }
    h.send("N 7 Alice");
    h.send("C 7 0.5");
    h.frame(0.016);

    let players = h.master.game().players();
    assert_eq!(players.len(), 8);
    let alice = players.get(7).unwrap();
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.turn_speed, 0.5);
    assert!(players.iter().take(7).all(|p| p.turn_speed == 0.0));
}

#[test]
fn bad_input_is_dropped_without_side_effects() {
    let mut h = Harness::new(config());
    h.send("Connected");
    h.send("C x 1");
    h.send("Z 1 2");
    h.send("C 5 1.0");
    h.send("D 0");
    h.send("N 3 Skipped");
    h.frame(0.016);
    assert!(h.master.game().players().is_empty());
    assert!(!h.master.game().session().is_started());

    h.send("N 0 First");
    h.frame(0.016);
    assert_eq!(h.master.game().players().len(), 1);
    assert_eq!(h.client.game().players().len(), 1);
}

#[test]
fn colour_request_answers_with_two_messages() {
    let mut h = Harness::new(config());
    h.send("N 0 Alice");
    h.send("I 0");
    h.frame(0.016);
    let colours: Vec<String> = h
        .relay_messages()
        .into_iter()
        .filter(|m| m.starts_with('A') || m.starts_with('B'))
        .collect();
    assert_eq!(colours.len(), 2);
    assert!(colours[0].starts_with("A vec3(") && colours[0].ends_with(") 0"));
    assert!(colours[1].starts_with("B vec3(") && colours[1].ends_with(") 0"));
}

#[test]
fn score_reports_flush_after_sync() {
    let mut cfg = config();
    cfg.session.start = StartPolicy::Immediately;
    let mut h = Harness::new(cfg);
    let game = h.master.game_mut();
    game.add_debug_player(SphericalPosition::IDENTITY).unwrap();
    game.add_debug_collectible(SphericalPosition::IDENTITY, 0)
        .unwrap();

    h.frame(0.016); // first update only records the time
    h.frame(0.016);

    let messages = h.relay_messages();
    assert!(messages.iter().any(|m| m == "P 0   1"), "{messages:?}");
    assert!(h.client.game().players().get(0).unwrap().points >= 1);

    h.frame(0.016);
    assert!(!h.relay_messages().iter().any(|m| m == "P 0   1"));
}

#[test]
fn five_players_against_two_known() {
    let mut h = Harness::new(config());
    h.send("N 0 a");
    h.send("N 1 b");
    h.frame(0.016);
    assert_eq!(h.client.game().players().len(), 2);

    for (id, name) in [(2, "c"), (3, "d"), (4, "e")] {
        h.send(&format!("N {id} {name}"));
    }
    h.send("D 0");
    h.frame(0.016);

    let players = h.client.game().players();
    assert_eq!(players.len(), 5);
    assert!(!players.get(0).unwrap().enabled);
    assert_eq!(players.get(4).unwrap().name, "e");
}

#[test]
fn session_end_reaches_the_render_node() {
    let mut cfg = config();
    cfg.session.max_time = 1.0;
    cfg.session.start = StartPolicy::Immediately;
    let mut h = Harness::new(cfg);

    h.frame(0.0);
    h.frame(0.6);
    assert!(!h.client.game().flags().game_ended);
    h.frame(0.6);

    let flags = h.client.game().flags();
    assert!(flags.game_started && flags.game_ended && flags.stats_visible);
    let messages = h.relay_messages();
    assert_eq!(messages.iter().filter(|m| *m == "U start").count(), 1);
    assert_eq!(messages.iter().filter(|m| *m == "U end").count(), 1);

    h.frame(5.0);
    assert!(!h.relay_messages().iter().any(|m| m == "U end"));
}

#[test]
fn corrupt_frames_leave_the_replica_alone() {
    let mut h = Harness::new(config());
    h.send("N 0 a");
    h.frame(0.016);

    h.client.decode(Bytes::from_static(&[0, 1]));
    h.client.post_sync();
    assert_eq!(h.client.game().players().len(), 1);

    // Master never takes frames in.
    h.master.decode(Bytes::from_static(&[0, 0, 1, 0, 0, 0, 0]));
    assert_eq!(h.master.game().players().len(), 1);
}

#[test]
fn late_render_node_needs_resync() {
    let mut h = Harness::new(config());
    h.send("N 0 a");
    h.frame(0.016);

    let mut late = ClientNode::new(&config());
    late.decode(h.master.encode().unwrap());
    late.post_sync();
    assert!(late.game().players().is_empty());

    h.master.game_mut().resync();
    late.decode(h.master.encode().unwrap());
    late.post_sync();
    assert_eq!(late.game().players().len(), 1);
}
