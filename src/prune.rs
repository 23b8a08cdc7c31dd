/// Incremental row cut-off for matrix building.
///
/// `alpha` is the best worst-case among rows scored to completion. A row whose
/// running minimum drops strictly below it can never be the maximin choice,
/// so the rest of its replies need not be scored. Only complete rows raise
/// `alpha`.
#[derive(Clone, Debug)]
pub struct RowPruner {
    enabled: bool,
    alpha: f64,
    probe: Vec<usize>,
}

impl RowPruner {
    pub fn new(enabled: bool, replies: usize) -> Self {
        RowPruner {
            enabled,
            alpha: f64::NEG_INFINITY,
            probe: (0..replies).collect(),
        }
    }

    pub fn probe_order(&self) -> &[usize] {
        &self.probe
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether a row whose worst score so far is `row_worst` must still be
    /// scored to completion.
    pub fn keep(&self, row_worst: f64) -> bool {
        !self.enabled || row_worst >= self.alpha
    }

    /// Records that the reply at `reply` cut a row. It is probed first from
    /// now on, since a reply that refutes one action tends to refute others.
    pub fn cut_by(&mut self, reply: usize) {
        if let Some(pos) = self.probe.iter().position(|&idx| idx == reply) {
            self.probe[..=pos].rotate_right(1);
        }
    }

    pub fn finish_row(&mut self, row_worst: f64) {
        if row_worst > self.alpha {
            self.alpha = row_worst;
        }
    }
}
