//! Function-pointer finite state machine engine for the comms session.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌───────────┬──────────────┬──────────┬──────────────────┐  │
//! │  │ StateId   │ on_enter     │ on_exit  │ on_update        │  │
//! │  ├───────────┼──────────────┼──────────┼──────────────────┤  │
//! │  │ Resyncing │ fn(ctx, io)  │    -     │ fn(ctx,io)->Opt  │  │
//! │  │ Identity  │      -       │    -     │ fn(ctx,io)->Opt  │  │
//! │  │ Streaming │ fn(ctx, io)  │    -     │ fn(ctx,io)->Opt  │  │
//! │  └───────────┴──────────────┴──────────┴──────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the current
//! pointer.  Handlers receive the [`SessionContext`] plus the I/O ports,
//! because every state talks to the coprocessor.

pub mod context;
pub mod states;
mod streaming;

use context::SessionContext;
use log::info;

use crate::app::ports::SessionPorts;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Session states.  Must stay in sync with [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Resyncing = 0,
    Identity = 1,
    Streaming = 2,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert an index back to `StateId`.  Out-of-range falls back to
    /// `Resyncing` (asserts in debug builds).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Resyncing,
            1 => Self::Identity,
            2 => Self::Streaming,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Resyncing
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn<P> = fn(&mut SessionContext, &mut P);

/// Per-tick update handler.  Returns `Some(next)` to transition.
pub type StateUpdateFn<P> = fn(&mut SessionContext, &mut P) -> Option<StateId>;

/// Static descriptor for a single FSM state.
pub struct StateDescriptor<P> {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn<P>>,
    pub on_exit: Option<StateActionFn<P>>,
    pub on_update: StateUpdateFn<P>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine, generic over the port bundle `P`.
pub struct Fsm<P> {
    table: [StateDescriptor<P>; StateId::COUNT],
    current: usize,
    tick_count: u64,
    state_entry_tick: u64,
}

impl<P: SessionPorts> Fsm<P> {
    pub fn new(table: [StateDescriptor<P>; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut SessionContext, io: &mut P) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx, io);
        }
    }

    /// Advance the FSM by one tick.
    pub fn tick(&mut self, ctx: &mut SessionContext, io: &mut P) {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_ticks = self.tick_count;

        let next = (self.table[self.current].on_update)(ctx, io);

        if let Some(next_id) = next {
            self.transition(next_id, ctx, io);
        }
    }

    /// Force an immediate transition, running exit/enter actions.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut SessionContext, io: &mut P) {
        if next as usize != self.current {
            self.transition(next, ctx, io);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut SessionContext, io: &mut P) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx, io);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx, io);
        }
    }
}
