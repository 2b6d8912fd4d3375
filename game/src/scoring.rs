//! Score arithmetic and the data behind the end-of-game performance chart.

pub const CORRECT_POINTS: i32 = 10;
pub const INCORRECT_POINTS: i32 = -5;

pub fn points(correct: bool) -> i32 {
    if correct { CORRECT_POINTS } else { INCORRECT_POINTS }
}

pub fn total(history: &[bool]) -> i32 {
    history.iter().map(|&correct| points(correct)).sum()
}

/// Best possible score for a batch of `question_count` questions.
pub fn max_score(question_count: usize) -> i32 {
    question_count as i32 * CORRECT_POINTS
}

/// One point of the performance chart. The origin has no outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPoint {
    pub index: usize,
    pub score: i32,
    pub correct: Option<bool>,
}

/// Origin `(0, 0)` followed by the running score after each answered question.
pub fn chart_points(history: &[bool]) -> Vec<ChartPoint> {
    let mut points = Vec::with_capacity(history.len() + 1);
    points.push(ChartPoint {
        index: 0,
        score: 0,
        correct: None,
    });
    let mut running = 0;
    for (i, &correct) in history.iter().enumerate() {
        running += self::points(correct);
        points.push(ChartPoint {
            index: i + 1,
            score: running,
            correct: Some(correct),
        });
    }
    points
}

/// Vertical range of the chart; always spans at least `[0, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartScale {
    pub min: i32,
    pub max: i32,
}

impl ChartScale {
    pub fn for_points(points: &[ChartPoint]) -> Self {
        let min = points.iter().map(|p| p.score).fold(0, i32::min);
        let max = points.iter().map(|p| p.score).fold(CORRECT_POINTS, i32::max);
        Self { min, max }
    }

    pub fn range(&self) -> i32 {
        self.max - self.min
    }

    /// Position of `score` inside the scale, `0.0` at `min` and `1.0` at `max`.
    pub fn fraction(&self, score: i32) -> f32 {
        (score - self.min) as f32 / self.range().max(1) as f32
    }
}

/// Projects chart points into a fixed view box, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartGeometry {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
}

impl Default for ChartGeometry {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 50.0,
            padding: 5.0,
        }
    }
}

impl ChartGeometry {
    pub fn project(&self, points: &[ChartPoint]) -> Vec<(f32, f32)> {
        let scale = ChartScale::for_points(points);
        let last = points.len().saturating_sub(1).max(1) as f32;
        points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let x = self.padding + (i as f32 / last) * (self.width - 2.0 * self.padding);
                let y = self.height
                    - self.padding
                    - scale.fraction(p.score) * (self.height - 2.0 * self.padding);
                (x, y)
            })
            .collect()
    }
}

/// End-of-game verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Legend,
    Aficionado,
    Solid,
    Casual,
    Ouch,
}

impl Rating {
    pub fn for_score(score: i32, question_count: usize) -> Self {
        let max = max_score(question_count);
        if score == max && max > 0 {
            Rating::Legend
        } else if score as f32 >= max as f32 * 0.8 && score > 0 {
            Rating::Aficionado
        } else if score as f32 >= max as f32 * 0.5 && score > 0 {
            Rating::Solid
        } else if score > 0 {
            Rating::Casual
        } else {
            Rating::Ouch
        }
    }
}
