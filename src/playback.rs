//! Clip playback for the swarm.
//!
//! Every agent with a clip gets an [`AnimationPlayer`]. Starting all players
//! at once would make the whole swarm flap in lockstep, so
//! [`PlaybackScheduler::start_all`] puts one delayed `Play` per player into a
//! discrete event queue, `index * stagger` after the start time. The queue is
//! drained by [`PlaybackScheduler::poll`] and the players advance on the
//! tracker's frame callback through [`PlaybackScheduler::advance`].

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use instant::Duration;

use crate::{
    config::Settings,
    resources::animation::{AnimationClip, Pose},
    swarm::AgentId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

/// Plays one clip on one agent. Starts stopped and is played at most once.
#[derive(Clone, Debug)]
pub struct AnimationPlayer {
    id: PlayerId,
    agent: AgentId,
    clip: AnimationClip,
    state: PlayState,
    time: f32,
    started_at: Option<Duration>,
}

impl AnimationPlayer {
    fn new(id: PlayerId, agent: AgentId, clip: AnimationClip) -> Self {
        Self {
            id,
            agent,
            clip,
            state: PlayState::Stopped,
            time: 0.0,
            started_at: None,
        }
    }

    pub fn play(&mut self, now: Duration) {
        if self.state == PlayState::Playing {
            return;
        }
        self.state = PlayState::Playing;
        self.started_at = Some(now);
    }

    /// Moves the clip forward by `dt` seconds, looping at the clip's end.
    /// Does nothing before the player was started.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.state != PlayState::Playing {
            return false;
        }
        let duration = self.clip.duration();
        self.time = if duration > 0.0 {
            (self.time + dt).rem_euclid(duration)
        } else {
            0.0
        };
        true
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// Local clip time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn started_at(&self) -> Option<Duration> {
        self.started_at
    }

    pub fn pose(&self) -> Option<Pose> {
        self.clip.sample(self.time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Play(PlayerId),
}

#[derive(Debug, PartialEq, Eq)]
struct Scheduled {
    at: Duration,
    seq: u64,
    action: Action,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Owns all players and the queue of pending starts.
#[derive(Debug)]
pub struct PlaybackScheduler {
    players: Vec<AnimationPlayer>,
    queue: BinaryHeap<Reverse<Scheduled>>,
    stagger: Duration,
    seq: u64,
}

impl PlaybackScheduler {
    pub fn new(stagger: Duration) -> Self {
        Self {
            players: Vec::new(),
            queue: BinaryHeap::new(),
            stagger,
            seq: 0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.stagger)
    }

    /// Binds `clip` to `agent`; ids follow registration order.
    pub fn register_player(&mut self, agent: AgentId, clip: AnimationClip) -> PlayerId {
        let id = PlayerId(self.players.len());
        self.players.push(AnimationPlayer::new(id, agent, clip));
        id
    }

    /// Delay of every registered player's start relative to `start_all`.
    pub fn start_delays(&self) -> Vec<Duration> {
        (0..self.players.len())
            .map(|index| self.stagger * index as u32)
            .collect()
    }

    /// Queues one delayed start per stopped player, staggered by registration index.
    pub fn start_all(&mut self, now: Duration) {
        let delays = self.start_delays();
        for (player, delay) in self.players.iter().zip(delays) {
            if player.is_playing() {
                continue;
            }
            self.queue.push(Reverse(Scheduled {
                at: now + delay,
                seq: self.seq,
                action: Action::Play(player.id),
            }));
            self.seq += 1;
        }
        log::debug!("Queued {} staggered clip starts.", self.queue.len());
    }

    /// When the next queued start is due, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(scheduled)| scheduled.at)
    }

    /// Fires every start due at `now`, earliest first. Returns how many fired.
    pub fn poll(&mut self, now: Duration) -> usize {
        let mut fired = 0;
        while self
            .queue
            .peek()
            .is_some_and(|Reverse(scheduled)| scheduled.at <= now)
        {
            let Some(Reverse(scheduled)) = self.queue.pop() else {
                break;
            };
            match scheduled.action {
                Action::Play(id) => match self.players.get_mut(id.0) {
                    // the timestamp is the scheduled time, not when polling caught up
                    Some(player) => player.play(scheduled.at),
                    None => log::warn!("Dropping start of detached player {:?}.", id),
                },
            }
            fired += 1;
        }
        fired
    }

    /// Forwards `dt` seconds to every player. Returns how many actually moved.
    pub fn advance(&mut self, dt: f32) -> usize {
        if self.players.is_empty() {
            return 0;
        }
        self.players
            .iter_mut()
            .map(|player| player.advance(dt))
            .filter(|advanced| *advanced)
            .count()
    }

    pub fn players(&self) -> &[AnimationPlayer] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&AnimationPlayer> {
        self.players.get(id.0)
    }

    pub fn pending_starts(&self) -> usize {
        self.queue.len()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Drops every pending start and detaches all players.
    pub fn teardown(&mut self) -> usize {
        self.queue.clear();
        let detached = self.players.len();
        self.players.clear();
        detached
    }
}
