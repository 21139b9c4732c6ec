//! Text and graphics state machine for content stream replay.
//!
//! [`TextState`] tracks the text object (BT/ET), the text and line
//! matrices and the text state parameters (Tc, Tw, Tz, TL, Tf, Tr, Ts).
//! [`GraphicsStack`] tracks the CTM and saves/restores the parameters
//! across `q`/`Q`.

use pdfmodifier_core::Ctm;

/// Text state parameters that belong to the graphics state
/// and are saved/restored by `q`/`Q`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    /// Character spacing (Tc), unscaled text space units.
    pub char_spacing: f64,
    /// Word spacing (Tw), applied to single-byte code 32.
    pub word_spacing: f64,
    /// Horizontal scaling (Tz) as a fraction: `100 Tz` is 1.0.
    pub horizontal_scaling: f64,
    /// Leading (TL).
    pub leading: f64,
    /// Font selected by Tf, as a slot in the indexer's font table.
    /// `None` before any Tf.
    pub font: Option<usize>,
    /// Font size set by Tf.
    pub font_size: f64,
    /// Text rendering mode (Tr), 0-7.
    pub render_mode: i64,
    /// Text rise (Ts).
    pub rise: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            font: None,
            font_size: 0.0,
            render_mode: 0,
            rise: 0.0,
        }
    }
}

/// Text state tracked while replaying a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextState {
    pub params: TextParams,
    in_text_object: bool,
    /// Set by Tm, moved by Td/TD/T* and advanced by show-text operators.
    text_matrix: Ctm,
    /// Start of the current line.
    line_matrix: Ctm,
}

impl TextState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_text_object(&self) -> bool {
        self.in_text_object
    }

    pub fn text_matrix(&self) -> Ctm {
        self.text_matrix
    }

    pub fn line_matrix(&self) -> Ctm {
        self.line_matrix
    }

    /// `BT`: reset both matrices to identity.
    pub fn begin_text(&mut self) {
        self.text_matrix = Ctm::identity();
        self.line_matrix = Ctm::identity();
        self.in_text_object = true;
    }

    /// `ET`
    pub fn end_text(&mut self) {
        self.in_text_object = false;
    }

    /// `Tf`
    pub fn set_font(&mut self, slot: usize, size: f64) {
        self.params.font = Some(slot);
        self.params.font_size = size;
    }

    /// `Tz`, given as a percentage.
    pub fn set_horizontal_scaling_percent(&mut self, percent: f64) {
        self.params.horizontal_scaling = percent / 100.0;
    }

    /// `Tm`: replace (not concatenate) both matrices.
    pub fn set_text_matrix(&mut self, m: Ctm) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: translate the line matrix and reset the text matrix to it.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`: `-ty TL` followed by `tx ty Td`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.params.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*`: `0 -TL Td`.
    pub fn next_line(&mut self) {
        let leading = self.params.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Move the text matrix `tx` units along the baseline after showing
    /// glyphs. The line matrix is unchanged.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, 0.0).concat(&self.text_matrix);
    }
}

/// CTM plus the `q`/`Q` save stack.
#[derive(Debug, Clone, Default)]
pub struct GraphicsStack {
    ctm: Ctm,
    saved: Vec<(Ctm, TextParams)>,
}

impl GraphicsStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ctm(&self) -> Ctm {
        self.ctm
    }

    /// `cm`: the new matrix applies before the current CTM.
    pub fn concat(&mut self, m: &Ctm) {
        self.ctm = m.concat(&self.ctm);
    }

    /// `q`
    pub fn save(&mut self, params: &TextParams) {
        self.saved.push((self.ctm, params.clone()));
    }

    /// `Q`. Returns the saved text parameters, or `None` when the stack
    /// is empty (an unbalanced `Q`).
    pub fn restore(&mut self) -> Option<TextParams> {
        let (ctm, params) = self.saved.pop()?;
        self.ctm = ctm;
        Some(params)
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_matrix(m: Ctm, expected: [f64; 6]) {
        for (actual, expected) in m.to_array().iter().zip(expected) {
            assert!(
                (actual - expected).abs() < 1e-10,
                "expected {expected:?}, got {:?}",
                m.to_array()
            );
        }
    }

    #[test]
    fn defaults() {
        let ts = TextState::new();
        assert!(!ts.in_text_object());
        assert_eq!(ts.params.horizontal_scaling, 1.0);
        assert_eq!(ts.params.font, None);
        assert_matrix(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn begin_text_resets_matrices_not_params() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.set_font(0, 12.0);
        ts.params.char_spacing = 0.5;
        ts.set_text_matrix(Ctm::new(1.0, 0.0, 0.0, 1.0, 72.0, 700.0));
        ts.end_text();
        assert!(!ts.in_text_object());

        ts.begin_text();
        assert!(ts.in_text_object());
        assert_matrix(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(ts.params.font, Some(0));
        assert_eq!(ts.params.char_spacing, 0.5);
    }

    #[test]
    fn td_moves_from_line_start() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position(72.0, 700.0);
        ts.advance(50.0);
        assert_matrix(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 122.0, 700.0]);
        assert_matrix(ts.line_matrix(), [1.0, 0.0, 0.0, 1.0, 72.0, 700.0]);

        ts.move_text_position(0.0, -14.0);
        assert_matrix(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 72.0, 686.0]);
    }

    #[test]
    fn td_in_scaled_text_matrix() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.set_text_matrix(Ctm::new(2.0, 0.0, 0.0, 2.0, 100.0, 500.0));
        ts.move_text_position(10.0, -5.0);
        assert_matrix(ts.text_matrix(), [2.0, 0.0, 0.0, 2.0, 120.0, 490.0]);
        ts.advance(3.0);
        assert_matrix(ts.text_matrix(), [2.0, 0.0, 0.0, 2.0, 126.0, 490.0]);
    }

    #[test]
    fn capital_td_sets_leading_and_next_line_uses_it() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position_and_set_leading(72.0, -14.0);
        assert_eq!(ts.params.leading, 14.0);
        ts.next_line();
        assert_matrix(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 72.0, -28.0]);
    }

    #[test]
    fn tm_replaces_matrix() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position(10.0, 10.0);
        ts.set_text_matrix(Ctm::new(1.0, 0.0, 0.0, 1.0, 5.0, 5.0));
        assert_matrix(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 5.0, 5.0]);
        assert_matrix(ts.line_matrix(), [1.0, 0.0, 0.0, 1.0, 5.0, 5.0]);
    }

    #[test]
    fn horizontal_scaling_percent() {
        let mut ts = TextState::new();
        ts.set_horizontal_scaling_percent(50.0);
        assert_eq!(ts.params.horizontal_scaling, 0.5);
    }

    #[test]
    fn graphics_stack_save_restore() {
        let mut stack = GraphicsStack::new();
        let mut params = TextParams::default();
        stack.save(&params);
        stack.concat(&Ctm::new(2.0, 0.0, 0.0, 2.0, 10.0, 10.0));
        stack.concat(&Ctm::new(1.0, 0.0, 0.0, 1.0, 5.0, 0.0));
        // the later cm applies first: (5,0) scaled then shifted
        assert_matrix(stack.ctm(), [2.0, 0.0, 0.0, 2.0, 20.0, 10.0]);
        params.char_spacing = 3.0;
        assert_eq!(stack.depth(), 1);

        let restored = stack.restore().unwrap();
        assert_eq!(restored.char_spacing, 0.0);
        assert_matrix(stack.ctm(), [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert!(stack.restore().is_none());
    }
}
