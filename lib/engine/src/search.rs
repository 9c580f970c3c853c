/*
 * 搜索
 *
 * 迭代加深 + PVS (主要变例搜索)，辅以
 * - 置换表：排序提示与截断
 * - 空着裁剪、将军延伸、后期走法减少 (LMR)
 * - 杀手走法与历史启发排序
 * - 静态搜索：只看吃子，被将军时看全部应将
 * 每次搜索开始都清空置换表、杀手表和历史表，相同局面相同参数得到相同结果
 */
use std::cmp::Reverse;
use std::time::{Duration, Instant};

use common::PieceType;
use log::debug;

use crate::board::{piece_kind, Board, Cell, Move, BOARD_SIZE};
use crate::config::EngineConfig;
use crate::constant::{material_value, BAN_VALUE, DRAW_VALUE, MATE_VALUE, MAX_PLY, WIN_VALUE};
use crate::prng::XoShiRo;
use crate::tt::{HashFlag, TranspositionTable};

/// 根节点随机扰动 [-8, 8)
const NOISE_LO: i32 = -8;
const NOISE_HI: i32 = 8;

/// 根节点一次迭代的结果
struct RootResult {
    value: i32,
    best_move: Option<Move>,
    aborted: bool,
}

/// AI搜索状态
/// 包含所有搜索相关的临时数据，与Board的纯游戏状态分离
pub struct SearchSession {
    /// 搜索节点计数器
    pub counter: u64,
    config: EngineConfig,
    /// 置换表
    records: TranspositionTable,
    /// 当前搜索距离根节点的步数
    distance: i32,
    /// 杀手走法表：每层保存2个走法
    killer_table: Vec<[Option<Move>; 2]>,
    /// 历史启发表，下标 from * BOARD_SIZE + to
    history_table: Vec<i32>,
    rng: XoShiRo,
    started: Instant,
    hard_limit: Option<Duration>,
}

impl SearchSession {
    pub fn new(config: EngineConfig) -> Self {
        SearchSession {
            counter: 0,
            records: TranspositionTable::new(config.hash_bits),
            config,
            distance: 0,
            killer_table: vec![[None, None]; MAX_PLY + 1],
            history_table: vec![0; BOARD_SIZE * BOARD_SIZE],
            rng: XoShiRo::from_entropy(),
            started: Instant::now(),
            hard_limit: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_max_depth(&mut self, depth: i32) {
        self.config.max_depth = depth.max(1);
    }

    /// 重置搜索状态（用于新的搜索）
    pub fn reset(&mut self) {
        self.counter = 0;
        self.distance = 0;
        self.records.clear();
        self.killer_table.iter_mut().for_each(|k| *k = [None, None]);
        self.history_table.iter_mut().for_each(|h| *h = 0);
    }

    fn history_index(mv: Move) -> usize {
        mv.from * BOARD_SIZE + mv.to
    }

    fn update_killer_move(&mut self, mv: Move) {
        let Some(killers) = self.killer_table.get_mut(self.distance as usize) else {
            return;
        };
        if killers[0] != Some(mv) {
            killers[1] = killers[0];
            killers[0] = Some(mv);
        }
    }

    fn update_history(&mut self, mv: Move, depth: i32) {
        self.history_table[Self::history_index(mv)] += depth * depth;
    }

    // 排序键 (类别, 分数) 降序：置换表走法 > 吃子 (MVV/LVA) > 杀手1 > 杀手2 > 历史分
    fn sort_moves(&self, board: &Board, moves: &mut [Move], hash_move: Option<Move>) {
        let killers = self
            .killer_table
            .get(self.distance as usize)
            .copied()
            .unwrap_or([None, None]);
        moves.sort_by_key(|&mv| {
            if Some(mv) == hash_move {
                return Reverse((4, 0));
            }
            if let (Cell::Piece(victim), Cell::Piece(attacker)) = (board.cell(mv.to), board.cell(mv.from)) {
                let score = material_value(piece_kind(victim)) * 10 - material_value(piece_kind(attacker));
                return Reverse((3, score));
            }
            if killers[0] == Some(mv) {
                return Reverse((2, 0));
            }
            if killers[1] == Some(mv) {
                return Reverse((1, 0));
            }
            Reverse((0, self.history_table[Self::history_index(mv)]))
        });
    }

    /// 重复局面的分值：单方长将判负，双方长将或普通重复判和
    pub fn rep_value(&self, rep_status: i32) -> i32 {
        let own_perpetual = rep_status & 2 != 0;
        let opp_perpetual = rep_status & 4 != 0;
        match (own_perpetual, opp_perpetual) {
            (true, false) => -BAN_VALUE + self.distance,
            (false, true) => BAN_VALUE - self.distance,
            _ => DRAW_VALUE,
        }
    }

    pub fn alpha_beta_pvs(&mut self, board: &mut Board, depth: i32, mut alpha: i32, beta: i32, allow_null: bool) -> i32 {
        self.counter += 1;
        if self.distance as usize >= MAX_PLY {
            return board.evaluate();
        }

        if self.distance > 0 {
            let rep = board.rep_status(1);
            if rep > 0 {
                return self.rep_value(rep);
            }
        }

        let (tt_value, hash_move) = self.records.find_record(board, alpha, beta, depth, self.distance);
        if let Some(v) = tt_value {
            return v;
        }

        if depth <= 0 {
            return self.quies(board, alpha, beta);
        }

        // 杀棋步数裁剪：这里最好也只能是 distance 步后将死对方
        if MATE_VALUE - self.distance <= alpha {
            return alpha;
        }

        let in_check = board.in_check(board.turn);
        if allow_null
            && !in_check
            && depth >= self.config.null_move_min_depth
            && board.null_move_okay()
            && board.evaluate() >= beta
        {
            board.make_null_move();
            self.distance += 1;
            let depth = depth - 1 - self.config.null_move_reduction;
            let v = -self.alpha_beta_pvs(board, depth, -beta, -beta + 1, false);
            self.distance -= 1;
            board.unmake_null_move();
            if v >= beta {
                return beta;
            }
        }

        let mut moves = board.generate_move(false);
        self.sort_moves(board, &mut moves, hash_move);

        let player = board.turn;
        let orig_alpha = alpha;
        let mut best_value = -MATE_VALUE;
        let mut best_move = None;
        let mut count = 0;

        for mv in moves {
            // 能吃将说明对方上一步送将，直接算赢
            if let Cell::Piece(id) = board.cell(mv.to) {
                if piece_kind(id) == PieceType::King {
                    return MATE_VALUE - self.distance;
                }
            }
            let quiet = board.cell(mv.to) == Cell::Empty;
            if !board.make_move(mv) {
                continue;
            }
            if board.in_check(player) {
                board.unmake_move();
                continue;
            }
            count += 1;
            self.distance += 1;

            let gives_check = board.last_move_checks();
            let new_depth = if gives_check { depth } else { depth - 1 };
            let v = if count == 1 {
                -self.alpha_beta_pvs(board, new_depth, -beta, -alpha, true)
            } else {
                let reduction = if quiet
                    && !gives_check
                    && !in_check
                    && count > self.config.lmr_min_moves
                    && depth >= self.config.lmr_min_depth
                {
                    self.config.lmr_reduction
                } else {
                    0
                };
                let mut v = -self.alpha_beta_pvs(board, new_depth - reduction, -alpha - 1, -alpha, true);
                if v > alpha && reduction > 0 {
                    v = -self.alpha_beta_pvs(board, new_depth, -alpha - 1, -alpha, true);
                }
                if v > alpha && v < beta {
                    v = -self.alpha_beta_pvs(board, new_depth, -beta, -alpha, true);
                }
                v
            };

            self.distance -= 1;
            board.unmake_move();

            if v > best_value {
                best_value = v;
                best_move = Some(mv);
                if v >= beta {
                    if quiet {
                        self.update_killer_move(mv);
                        self.update_history(mv, depth);
                    }
                    self.records.add_record(board, depth, v, HashFlag::Beta, Some(mv), self.distance);
                    return v;
                }
                if v > alpha {
                    alpha = v;
                }
            }
        }

        // 无子可动即负，不存在和棋
        if count == 0 {
            return -MATE_VALUE + self.distance;
        }

        let flag = if best_value > orig_alpha {
            HashFlag::Exact
        } else {
            HashFlag::Alpha
        };
        self.records.add_record(board, depth, best_value, flag, best_move, self.distance);
        best_value
    }

    pub fn quies(&mut self, board: &mut Board, mut alpha: i32, beta: i32) -> i32 {
        self.counter += 1;
        if self.distance as usize >= MAX_PLY {
            return board.evaluate();
        }

        let in_check = board.in_check(board.turn);
        let mut best_value = -MATE_VALUE + self.distance;
        if !in_check {
            let v = board.evaluate();
            if v >= beta {
                return v;
            }
            best_value = v;
            alpha = alpha.max(v);
        }

        // 被将军时要看全部应将走法
        let mut moves = board.generate_move(!in_check);
        self.sort_moves(board, &mut moves, None);
        let player = board.turn;
        for mv in moves {
            if !board.make_move(mv) {
                continue;
            }
            if board.in_check(player) {
                board.unmake_move();
                continue;
            }
            self.distance += 1;
            let v = -self.quies(board, -beta, -alpha);
            self.distance -= 1;
            board.unmake_move();

            if v > best_value {
                best_value = v;
                if v >= beta {
                    return v;
                }
                alpha = alpha.max(v);
            }
        }
        best_value
    }

    fn out_of_time(&self) -> bool {
        self.hard_limit.is_some_and(|limit| self.started.elapsed() > limit)
    }

    // 根节点：root 中每个走法带一个固定的随机扰动，上一轮的最佳走法排在最前
    fn search_root(&mut self, board: &mut Board, depth: i32, root: &[(Move, i32)]) -> RootResult {
        let randomized = root.iter().any(|&(_, noise)| noise != 0);
        let mut best_key = -MATE_VALUE;
        let mut best = RootResult {
            value: -MATE_VALUE,
            best_move: None,
            aborted: false,
        };

        for (i, &(mv, noise)) in root.iter().enumerate() {
            if !board.make_move(mv) {
                continue;
            }
            self.distance = 1;
            let new_depth = if board.last_move_checks() { depth } else { depth - 1 };
            // 有扰动时放宽窗口，保证扰动后可能胜出的走法得到准确分值
            let alpha = if randomized { best_key - (NOISE_HI - NOISE_LO) } else { best_key };
            let v = if i == 0 {
                -self.alpha_beta_pvs(board, new_depth, -MATE_VALUE, MATE_VALUE, true)
            } else {
                let v = -self.alpha_beta_pvs(board, new_depth, -alpha - 1, -alpha, true);
                if v > alpha {
                    -self.alpha_beta_pvs(board, new_depth, -MATE_VALUE, -alpha, true)
                } else {
                    v
                }
            };
            self.distance = 0;
            board.unmake_move();

            let key = if v.abs() > WIN_VALUE { v } else { v + noise };
            if best.best_move.is_none() || key > best_key {
                best_key = key;
                best.value = v;
                best.best_move = Some(mv);
            }

            if depth > 1 && self.out_of_time() {
                best.aborted = true;
                break;
            }
        }
        best
    }

    /// 迭代加深。soft_limit 为本步分配时间，超过 soft_limit * root_abort_factor 时中止当前迭代。
    /// 无合法走法时返回 (-MATE_VALUE, None)
    pub fn iterative_deepening(
        &mut self,
        board: &mut Board,
        max_depth: i32,
        soft_limit: Option<Duration>,
        randomize: bool,
    ) -> (i32, Option<Move>) {
        self.reset();
        self.started = Instant::now();
        self.hard_limit = soft_limit.map(|limit| limit.mul_f64(self.config.root_abort_factor));

        let mut root: Vec<(Move, i32)> = board
            .legal_moves()
            .into_iter()
            .map(|mv| (mv, 0))
            .collect();
        if root.is_empty() {
            return (-MATE_VALUE, None);
        }
        if randomize {
            for (_, noise) in root.iter_mut() {
                *noise = self.rng.range(NOISE_LO, NOISE_HI);
            }
        }

        let mut best_value = -MATE_VALUE;
        let mut best_move = None;
        for depth in 1..=max_depth.max(1) {
            let result = self.search_root(board, depth, &root);
            if let Some(mv) = result.best_move {
                best_value = result.value;
                best_move = Some(mv);
                // 稳定排序，把最佳走法提到最前
                root.sort_by_key(|&(m, _)| m != mv);
            }
            debug!(
                "depth {} score {} best {} nodes {} time {}ms{}",
                depth,
                best_value,
                best_move.map(|m| m.to_string()).unwrap_or_default(),
                self.counter,
                self.started.elapsed().as_millis(),
                if result.aborted { " (aborted)" } else { "" }
            );
            if result.aborted {
                break;
            }
            if best_value.abs() > WIN_VALUE {
                break;
            }
            if soft_limit.is_some_and(|limit| self.started.elapsed() > limit) {
                break;
            }
        }
        (best_value, best_move)
    }
}
