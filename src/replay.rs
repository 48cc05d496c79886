// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Execution path reconstruction
//!
//! This module implements the replay engine: a [`Decoder`] consumes
//! [`Payload`]s in encoder emission order and replays the traced program's
//! control flow, publishing every retired PC through a [`Sink`]. Instructions
//! are obtained through a [`Fetch`] oracle and cached internally.
//!
//! A [`Decoder`] is constructed via [`builder`]. It expects a format 3
//! synchronization packet first; feeding packets out of order, or packets
//! that contradict the replayed program, results in a fatal [`Error`]. After
//! an error the reconstruction is permanently out of sync and the decoder
//! must be discarded.
//!
//! One decoder instance serves exactly one hart's packet stream.

mod bpred;
mod cache;
mod stack;

pub mod error;
pub mod sink;


pub use bpred::BPRED_TABLE_SIZE;
pub use cache::{DECODE_CACHE_SIZE, JUMP_CACHE_SIZE};
pub use error::Error;
pub use sink::Sink;
pub use stack::MAX_CALL_DEPTH;

use core::fmt;

use log::{debug, info, trace, warn};

use crate::config::{Options, Parameters};
use crate::instruction::Instruction;
use crate::oracle::Fetch;
use crate::packet::{
    Branch, BranchPredictor, Exception, Extension, Format, JumpTargetIndex, Payload, Start,
    Support, Synchronization,
};
use crate::types::{Privilege, BAD_ADDRESS};

use bpred::Predictor;
use cache::{DecodeCache, JumpTargetCache};
use stack::ReturnStack;

/// Create a [`Builder`] for a [`Decoder`]
pub fn builder() -> Builder<crate::oracle::Empty, sink::Ignore> {
    Builder {
        oracle: crate::oracle::Empty,
        sink: sink::Ignore,
        params: Default::default(),
    }
}

/// Builder for [`Decoder`]s
///
/// Created via [`builder`]. A useful decoder needs at least an oracle; the
/// sink defaults to [`sink::Ignore`] and the parameters to their discovery
/// defaults.
#[derive(Copy, Clone, Debug)]
pub struct Builder<O, S> {
    oracle: O,
    sink: S,
    params: Parameters,
}

impl<O, S> Builder<O, S> {
    /// Use the given instruction oracle
    pub fn with_oracle<T: Fetch>(self, oracle: T) -> Builder<T, S> {
        Builder {
            oracle,
            sink: self.sink,
            params: self.params,
        }
    }

    /// Use the given PC transition sink
    pub fn with_sink<T: Sink>(self, sink: T) -> Builder<O, T> {
        Builder {
            oracle: self.oracle,
            sink,
            params: self.params,
        }
    }

    /// Use the given trace unit [`Parameters`]
    pub fn with_params(mut self, params: &Parameters) -> Self {
        self.params = *params;
        self
    }

    /// Build the [`Decoder`]
    ///
    /// Fails if the parameters request tables larger than this build
    /// supports.
    pub fn build(self) -> Result<Decoder<O, S>, Error<O::Error>>
    where
        O: Fetch,
        S: Sink,
    {
        let params = self.params;
        let call_depth = 1usize
            .checked_shl(u32::from(params.call_counter_width) + 2)
            .unwrap_or(usize::MAX);
        let return_stack = ReturnStack::new(call_depth).ok_or(Error::UnsupportedTableSize {
            what: "return stack",
            requested: call_depth,
            supported: MAX_CALL_DEPTH,
        })?;
        let jump_target =
            JumpTargetCache::new(params.jump_cache_index_width).ok_or(Error::UnsupportedTableSize {
                what: "jump target cache",
                requested: 1usize
                    .checked_shl(params.jump_cache_index_width.into())
                    .unwrap_or(usize::MAX),
                supported: JUMP_CACHE_SIZE,
            })?;
        let bpred = Predictor::new(params.bpred_index_width).ok_or(Error::UnsupportedTableSize {
            what: "branch predictor table",
            requested: 1usize
                .checked_shl(params.bpred_index_width.into())
                .unwrap_or(usize::MAX),
            supported: bpred::BPRED_TABLE_SIZE,
        })?;

        Ok(Decoder {
            oracle: self.oracle,
            sink: self.sink,
            params,
            options: Default::default(),
            pc: BAD_ADDRESS,
            last_pc: BAD_ADDRESS,
            last_sent_addr: BAD_ADDRESS,
            branches: 0,
            branch_map: 0,
            stop_at_last_branch: false,
            inferred_address: false,
            start_of_trace: true,
            privilege: Default::default(),
            return_stack,
            jump_target,
            bpred,
            decode_cache: DecodeCache::new(),
            cur: (BAD_ADDRESS, Default::default()),
            stats: Default::default(),
        })
    }
}

/// The replay engine
///
/// See the [module documentation][self] for an overview.
#[derive(Clone)]
pub struct Decoder<O, S> {
    oracle: O,
    sink: S,
    params: Parameters,
    options: Options,

    /// Current reconstructed PC
    pc: u64,
    /// PC of the previously retired instruction
    last_pc: u64,
    /// Most recent address reported by the encoder, fully expanded
    last_sent_addr: u64,
    /// Number of pending branch outcomes
    branches: u32,
    /// Pending branch outcomes, bit 0 next, set = not taken
    branch_map: u64,
    /// The follower must halt at the final pending branch
    stop_at_last_branch: bool,
    /// The last reported address may not be the final retired instruction
    inferred_address: bool,
    /// The next packet must be a format 3 synchronization packet
    start_of_trace: bool,
    /// Privilege level reported by the most recent sync packet
    privilege: Privilege,

    return_stack: ReturnStack,
    jump_target: JumpTargetCache,
    bpred: Predictor,
    decode_cache: DecodeCache,
    /// Most recently decoded instruction
    cur: (u64, Instruction),
    stats: Stats,
}

impl<O: Fetch, S: Sink> Decoder<O, S> {
    /// Process a single `te_inst` packet payload
    ///
    /// Payloads must be fed in exactly the order the encoder emitted them.
    /// On an `Err` the reconstruction cannot continue; see [`Error`].
    pub fn process_packet(&mut self, payload: &Payload) -> Result<(), Error<O::Error>> {
        debug!("processing {payload:?}");
        self.stats.count_packet(payload);

        if let Payload::Synchronization(sync) = payload {
            return self.process_sync(sync);
        }

        // carry in any miss-predict from the previous packet
        self.bpred.miss_predict_carry_in = self.bpred.miss_predict_carry_out;
        self.bpred.miss_predict_carry_out = false;

        if self.start_of_trace {
            return Err(Error::StartOfTrace);
        }

        if let Some(info) = payload.address_info() {
            self.update_sent_address(info.address);
        }

        self.bpred.correct_predictions = 0;

        if let Payload::Extension(ext) = payload {
            match ext {
                Extension::BranchPredictor(bp) => self.seed_branch_predictor(bp),
                Extension::JumpTargetIndex(jti) => self.seed_jump_target(jti),
            }
        } else {
            if payload.address_info().is_some() {
                self.stop_at_last_branch = false;
                if self.options.jump_target_cache {
                    let slot = self
                        .jump_target
                        .slot(self.last_sent_addr, self.params.iaddress_lsb);
                    debug!(
                        "jump-cache: writing {:#x} to jump_target[{slot:#x}]",
                        self.last_sent_addr
                    );
                    self.jump_target.insert(slot, self.last_sent_addr);
                }
            }
            if let Payload::Branch(branch) = payload {
                self.seed_branches(branch);
            }
        }

        self.follow_execution_path(self.last_sent_addr, false, payload.updiscon())
    }

    /// Retrieve the current reconstructed PC
    pub fn pc(&self) -> u64 {
        self.pc
    }

    /// Retrieve the privilege level reported by the most recent sync packet
    pub fn privilege(&self) -> Privilege {
        self.privilege
    }

    /// Retrieve the runtime options currently in effect
    pub fn options(&self) -> Options {
        self.options
    }

    /// Retrieve the statistics collected so far
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Process a format 3 payload
    fn process_sync(&mut self, sync: &Synchronization) -> Result<(), Error<O::Error>> {
        let (address, branch, privilege, exception) = match sync {
            Synchronization::Support(support) => return self.process_support(support),
            Synchronization::Context(_) => return Ok(()),
            Synchronization::Start(Start {
                branch,
                privilege,
                address,
            }) => (*address, *branch, *privilege, false),
            Synchronization::Exception(Exception {
                branch,
                privilege,
                address,
            }) => (*address, *branch, *privilege, true),
        };

        self.inferred_address = false;
        self.last_sent_addr = address << self.params.iaddress_lsb;
        self.privilege = privilege;

        if exception || self.start_of_trace {
            // expunge any pending branches
            self.branches = 0;
            self.branch_map = 0;
        }

        if self.bpred.miss_predict_carry_out {
            // carry in any miss-predict from the previous packet
            self.bpred.miss_predict_carry_out = false;
            self.bpred.miss_predict_carry_in = true;
        } else if self.decode(self.last_sent_addr)?.is_branch() {
            // the trace (re)starts on a branch, with its outcome in the
            // packet's branch bit
            self.branch_map |= u64::from(branch)
                .checked_shl(self.branches)
                .unwrap_or_default();
            self.branches += 1;
        }

        if !exception && !self.start_of_trace {
            self.follow_execution_path(self.last_sent_addr, true, false)?;
        } else {
            self.last_pc = self.pc;
            self.pc = self.last_sent_addr;
            self.advance()?;
            // A jump at this address must never pair with the pre-sync
            // instruction as a sequential jump. Rewriting last_pc to the PC
            // itself makes that pairing impossible.
            self.last_pc = self.pc;
        }

        self.start_of_trace = false;
        // the return stack is conceptually empty after synchronization
        self.return_stack.clear();
        Ok(())
    }

    /// Process a format 3 support payload
    fn process_support(&mut self, support: &Support) -> Result<(), Error<O::Error>> {
        use crate::packet::QualStatus;

        self.log_option_changes(&support.options);
        self.options = support.options;

        match support.qual_status {
            QualStatus::NoChange => return Ok(()),
            QualStatus::EndedRep => {}
            QualStatus::EndedUpd => {
                if self.inferred_address {
                    // resolve the pending second occurrence before the trace
                    // goes quiet
                    let previous_address = self.pc;
                    self.inferred_address = false;
                    while !self.next_pc(previous_address)? {}
                }
            }
            QualStatus::Lost => {
                warn!("trace packets lost, waiting for the next synchronization");
            }
        }

        // trace ended, get ready to start again
        self.start_of_trace = true;
        Ok(())
    }

    /// Fold a format 1 payload's branch information into the pending state
    fn seed_branches(&mut self, branch: &Branch) {
        self.stop_at_last_branch = branch.address.is_none();
        if self.bpred.miss_predict_carry_in {
            // the pending branch is the carried miss-predict, which is not
            // part of the map
            self.branch_map = branch.branch_map.bits();
        } else {
            self.branch_map |= branch
                .branch_map
                .bits()
                .checked_shl(self.branches)
                .unwrap_or_default();
        }
        self.branches += u32::from(branch.branch_count());
    }

    /// Seed predictor state from a format 0 branch predictor payload
    fn seed_branch_predictor(&mut self, bp: &BranchPredictor) {
        debug_assert!(self.options.branch_prediction);
        debug_assert!(bp.correct_predictions > 0);
        debug_assert!(self.branches <= 1);

        self.bpred.use_bmap_first = self.branches > 0 && !self.bpred.miss_predict_carry_in;
        self.bpred.correct_predictions = bp.correct_predictions;
        self.branches += bp.correct_predictions;
        if bp.address.is_none() {
            // one additional miss-predicted branch, resolved by the next
            // packet
            self.branches += 1;
            self.stop_at_last_branch = true;
            self.bpred.miss_predict_carry_out = true;
        }
    }

    /// Seed the reported address from a format 0 jump target index payload
    fn seed_jump_target(&mut self, jti: &JumpTargetIndex) {
        debug_assert!(self.options.jump_target_cache);

        self.stop_at_last_branch = false;
        self.last_sent_addr = self.jump_target.get(jti.index);
        debug!(
            "jump-cache: using jump_target[{:#x}] = {:#x}",
            jti.index, self.last_sent_addr
        );
        if !jti.branch_map.is_empty() {
            let shift = if self.bpred.miss_predict_carry_in {
                0
            } else {
                self.branches
            };
            self.branch_map |= jti.branch_map.bits().checked_shl(shift).unwrap_or_default();
            self.branches += u32::from(jti.branch_map.count());
        }
    }

    /// Apply a packet address field to `last_sent_addr`
    fn update_sent_address(&mut self, address: u64) {
        let expanded = address << self.params.iaddress_lsb;
        self.last_sent_addr = if self.options.full_address {
            expanded
        } else {
            self.last_sent_addr.wrapping_add(expanded)
        };
    }

    /// Follow the execution path to the reported address
    ///
    /// Walks the program one instruction at a time until the state of the
    /// reconstruction matches what the packet reports. `sync` distinguishes
    /// the authoritative stop of format 3 packets from the tentative stop of
    /// address-bearing packets, where the reported address may recur and the
    /// walk resumes with the next packet (`inferred_address`).
    fn follow_execution_path(
        &mut self,
        address: u64,
        sync: bool,
        updiscon: bool,
    ) -> Result<(), Error<O::Error>> {
        let previous_address = self.pc;
        loop {
            if self.stop_at_last_branch && self.branches == 0 {
                return Err(Error::DepletedBranchMap);
            }

            if self.inferred_address {
                // iterate from the previously reported address to find its
                // second occurrence
                let stop_here = self.next_pc(previous_address)?;
                if stop_here {
                    self.inferred_address = false;
                }
                continue;
            }

            let stop_here = self.next_pc(address)?;
            let insn = self.decode(self.pc)?;
            let branch_limit = u32::from(insn.is_branch());

            if self.branches == 1 && insn.is_branch() && self.stop_at_last_branch {
                // Reached the final branch. Do not follow it: whether its
                // successor retires is not yet known.
                self.stop_at_last_branch = false;
                return Ok(());
            }
            if stop_here {
                // reached the target of an uninferable discontinuity
                if self.branches > branch_limit {
                    return Err(Error::UnprocessedBranches {
                        pc: self.pc,
                        count: self.branches,
                    });
                }
                return Ok(());
            }
            if !sync
                && self.pc == address
                && !updiscon
                && !self.stop_at_last_branch
                && self.branches == branch_limit
            {
                // All branches processed and the reported address reached,
                // but not as an uninferable jump target. The instruction may
                // retire again before the packet's reason fires, so the stop
                // is tentative.
                self.inferred_address = true;
                return Ok(());
            }
            if sync && self.pc == address && self.branches == branch_limit {
                return Ok(());
            }
        }
    }

    /// Compute the next PC and publish the transition
    ///
    /// Returns `true` if the PC was set to `address` because of an
    /// uninferable discontinuity, i.e. nothing further can be inferred from
    /// the current packet.
    fn next_pc(&mut self, address: u64) -> Result<bool, Error<O::Error>> {
        let this_pc = self.pc;
        let insn = self.decode(this_pc)?;
        let mut stop_here = false;

        if insn.is_branch() {
            self.stats.branches += 1;
        }

        if let Some(target) = insn.inferable_jump_target() {
            self.pc = this_pc.wrapping_add_signed(target.into());
        } else if let Some(target) = self.sequential_jump_target(&insn)? {
            // lui/auipc directly followed by a jump through the same register
            self.pc = target;
        } else if let Some(link) = self.implicit_return_address(&insn) {
            debug!(
                "return-stack: popped [{:3}] --> {link:#x}",
                self.return_stack.depth()
            );
            self.pc = link;
        } else if insn.is_uninferable_discon() {
            if self.stop_at_last_branch {
                return Err(Error::UnexpectedDiscontinuity { pc: this_pc, insn });
            }
            self.pc = address;
            stop_here = true;
            self.stats.updiscons += 1;
        } else if let Some(target) = self.taken_branch_target(&insn)? {
            self.pc = target;
            self.stats.taken_branches += 1;
        } else {
            self.pc = this_pc.wrapping_add(insn.size.into());
        }

        if insn.is_call() {
            self.push_return_stack(this_pc, &insn);
            self.stats.calls += 1;
        }

        self.last_pc = this_pc;
        self.advance()?;

        Ok(stop_here)
    }

    /// If the current instruction concludes a sequential jump pair, compute
    /// the target
    fn sequential_jump_target(
        &mut self,
        insn: &Instruction,
    ) -> Result<Option<u64>, Error<O::Error>> {
        let Some((rs1, offset)) = insn.uninferable_jump() else {
            return Ok(None);
        };
        let prev = self.decode(self.last_pc)?;
        let Some((rd, upper)) = prev.upper_immediate(self.last_pc) else {
            return Ok(None);
        };
        Ok((rd == rs1).then(|| upper.wrapping_add_signed(offset.into())))
    }

    /// If the current instruction is an inferrable function return, pop its
    /// target off the return stack
    fn implicit_return_address(&mut self, insn: &Instruction) -> Option<u64> {
        (self.options.implicit_return && insn.is_return())
            .then(|| self.return_stack.pop())
            .flatten()
    }

    /// If the current instruction is a taken branch, resolve its target
    ///
    /// Resolves the branch outcome against the pending branch state,
    /// consuming one pending branch. Returns `None` for untaken branches and
    /// non-branches alike.
    fn taken_branch_target(
        &mut self,
        insn: &Instruction,
    ) -> Result<Option<u64>, Error<O::Error>> {
        let Some(target) = insn.branch_target() else {
            return Ok(None);
        };
        let pc = self.pc;

        if self.branches == 0 {
            return Err(Error::UnresolvableBranch { pc, insn: *insn });
        }
        self.branches -= 1;

        let slot = self.bpred.slot(pc, self.params.iaddress_lsb);
        let predicted = self.options.branch_prediction && self.bpred.predicted(slot);

        debug_assert!(!(self.bpred.use_bmap_first && self.bpred.miss_predict_carry_in));
        let (taken, source) = if self.bpred.use_bmap_first {
            // the branch map still holds one bit preceding the predicted run
            self.bpred.use_bmap_first = false;
            (self.pop_branch_bit(), "bmap[0]")
        } else if self.bpred.miss_predict_carry_in {
            self.bpred.miss_predict_carry_in = false;
            (!predicted, "carry-in")
        } else if self.bpred.correct_predictions > 0 {
            self.bpred.correct_predictions -= 1;
            (predicted, "bpred")
        } else {
            (self.pop_branch_bit(), "bmap")
        };

        if self.options.branch_prediction {
            let (old, new) = self.bpred.record(slot, taken);
            debug!(
                "bpred: {pc:#x}, table[{slot:#x}] = {old:02b} -> {new:02b}, \
                branches = {:2}, {source:8} {}",
                self.branches,
                if taken { "TAKEN" } else { "not taken" },
            );
        }

        Ok(taken.then(|| pc.wrapping_add_signed(target.into())))
    }

    /// Consume the next branch map bit
    ///
    /// A set bit records a branch not taken.
    fn pop_branch_bit(&mut self) -> bool {
        let taken = self.branch_map & 1 == 0;
        self.branch_map >>= 1;
        taken
    }

    /// Push a call's link address onto the return stack
    fn push_return_stack(&mut self, pc: u64, insn: &Instruction) {
        if !self.options.implicit_return {
            return;
        }
        let link = pc.wrapping_add(insn.size.into());
        debug!(
            "return-stack: pushed [{:3}] <-- {link:#x}",
            self.return_stack.depth()
        );
        self.return_stack.push(link);
    }

    /// Publish the transition to the current PC
    fn advance(&mut self) -> Result<(), Error<O::Error>> {
        debug_assert_ne!(self.pc, BAD_ADDRESS);
        debug_assert_eq!(self.last_pc == BAD_ADDRESS, self.stats.instructions == 0);

        let insn = self.decode(self.pc)?;
        trace!(
            "[{:2}] set_pc {:#x} -> {:#x}: {insn}",
            self.branches, self.last_pc, self.pc
        );
        self.sink.advance_pc(self.last_pc, self.pc, &insn);
        self.stats.instructions += 1;
        Ok(())
    }

    /// Decode the instruction at the given address
    ///
    /// Serves the request from the current-instruction shortcut or the
    /// decode cache where possible, fetching from the oracle otherwise.
    fn decode(&mut self, address: u64) -> Result<Instruction, Error<O::Error>> {
        debug_assert_ne!(address, BAD_ADDRESS);

        self.stats.fetches += 1;
        if self.cur.0 == address {
            self.stats.shortcuts += 1;
            return Ok(self.cur.1);
        }
        if let Some(insn) = self.decode_cache.get(address) {
            self.stats.cache_hits += 1;
            self.cur = (address, insn);
            return Ok(insn);
        }

        let bits = self
            .oracle
            .fetch(address)
            .map_err(|source| Error::CannotFetchInstruction { address, source })?;
        let insn = Instruction::from(bits);
        self.decode_cache.put(address, insn);
        self.cur = (address, insn);
        Ok(insn)
    }

    /// Log runtime options a support packet is about to change
    fn log_option_changes(&self, new: &Options) {
        macro_rules! log_change {
            ($flag:ident) => {
                if self.options.$flag != new.$flag {
                    info!(
                        concat!("configuration of ", stringify!($flag), " changed: {} -> {}"),
                        self.options.$flag, new.$flag
                    );
                }
            };
        }
        log_change!(full_address);
        log_change!(implicit_return);
        log_change!(jump_target_cache);
        log_change!(branch_prediction);
    }
}

impl<O, S> fmt::Debug for Decoder<O, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("pc", &format_args!("{:#x}", self.pc))
            .field("last_pc", &format_args!("{:#x}", self.last_pc))
            .field("last_sent_addr", &format_args!("{:#x}", self.last_sent_addr))
            .field("branches", &self.branches)
            .field("branch_map", &format_args!("{:#b}", self.branch_map))
            .field("stop_at_last_branch", &self.stop_at_last_branch)
            .field("inferred_address", &self.inferred_address)
            .field("start_of_trace", &self.start_of_trace)
            .field("privilege", &self.privilege)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Statistics over a [`Decoder`]'s lifetime
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of PC transitions published
    pub instructions: u64,
    /// Number of branch instructions encountered
    pub branches: u64,
    /// Number of taken branches
    pub taken_branches: u64,
    /// Number of uninferable discontinuities
    pub updiscons: u64,
    /// Number of function calls
    pub calls: u64,
    /// Packets processed, by format
    pub packets: [u64; 4],
    /// Format 3 packets processed, by subformat
    pub sync_subformats: [u64; 4],
    /// Format 0 packets processed, by extension
    pub extensions: [u64; 2],
    /// Instruction decode requests
    pub fetches: u64,
    /// Requests served by the current-instruction shortcut
    pub shortcuts: u64,
    /// Requests served by the decode cache
    pub cache_hits: u64,
}

impl Stats {
    fn count_packet(&mut self, payload: &Payload) {
        self.packets[payload.format() as usize] += 1;
        match payload {
            Payload::Synchronization(sync) => {
                let subformat = match sync {
                    Synchronization::Start(_) => 0,
                    Synchronization::Exception(_) => 1,
                    Synchronization::Context(_) => 2,
                    Synchronization::Support(_) => 3,
                };
                self.sync_subformats[subformat] += 1;
            }
            Payload::Extension(Extension::BranchPredictor(_)) => self.extensions[0] += 1,
            Payload::Extension(Extension::JumpTargetIndex(_)) => self.extensions[1] += 1,
            _ => {}
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "packets: {} extension, {} branch, {} address, {} sync",
            self.packets[Format::Extension as usize],
            self.packets[Format::Branch as usize],
            self.packets[Format::Address as usize],
            self.packets[Format::Synchronization as usize],
        )?;
        writeln!(
            f,
            "instructions: {}, branches: {} ({} taken), updiscons: {}, calls: {}",
            self.instructions, self.branches, self.taken_branches, self.updiscons, self.calls
        )?;
        if self.fetches != 0 {
            let percent = |n| (n * 100) as f64 / self.fetches as f64;
            writeln!(
                f,
                "decoded-cache: same = {:7} ({:5.2}%), hits = {:8} ({:5.2}%), \
                total = {:8}, combined hit-rate = {:.2}%",
                self.shortcuts,
                percent(self.shortcuts),
                self.cache_hits,
                percent(self.cache_hits),
                self.fetches,
                percent(self.shortcuts + self.cache_hits),
            )?;
        }
        Ok(())
    }
}
