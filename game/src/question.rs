use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Year = u16;

pub const OPTION_COUNT: usize = 4;

/// One "guess the release year" question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub artist: String,
    pub song_title: String,
    pub correct_year: Year,
    pub options: Vec<Year>,
    pub lyrics_snippet: String,
    pub album: String,
    pub release_date: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionDefect {
    #[error("expected {OPTION_COUNT} options, got {0}")]
    WrongOptionCount(usize),
    #[error("options are not unique")]
    DuplicateOptions,
    #[error("options do not include the correct year")]
    MissingCorrectYear,
    #[error("field `{0}` is empty")]
    EmptyField(&'static str),
}

impl Question {
    pub fn validate(&self) -> Result<(), QuestionDefect> {
        for (name, value) in [("artist", &self.artist), ("songTitle", &self.song_title)] {
            if value.trim().is_empty() {
                return Err(QuestionDefect::EmptyField(name));
            }
        }
        if self.options.len() != OPTION_COUNT {
            return Err(QuestionDefect::WrongOptionCount(self.options.len()));
        }
        let unique: HashSet<Year> = self.options.iter().copied().collect();
        if unique.len() != self.options.len() {
            return Err(QuestionDefect::DuplicateOptions);
        }
        if !unique.contains(&self.correct_year) {
            return Err(QuestionDefect::MissingCorrectYear);
        }
        Ok(())
    }

    pub fn is_correct(&self, year: Year) -> bool {
        year == self.correct_year
    }

    /// Fisher-Yates shuffle of the answer options.
    pub fn shuffle_options<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.options.shuffle(rng);
    }

    pub fn option(&self, position: usize) -> Option<Year> {
        self.options.get(position).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Fixed per-tier tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyConfig {
    pub question_count: usize,
    pub timer_seconds: u32,
    /// Slice of [`ARTIST_POOL`] the tier draws from.
    pub pool: Range<usize>,
    /// How many artists are sampled from the slice for one batch.
    pub artists_sampled: usize,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn config(self) -> DifficultyConfig {
        match self {
            Difficulty::Easy => DifficultyConfig {
                question_count: 10,
                timer_seconds: 15,
                pool: 0..20,
                artists_sampled: 10,
            },
            Difficulty::Medium => DifficultyConfig {
                question_count: 15,
                timer_seconds: 10,
                pool: 20..50,
                artists_sampled: 15,
            },
            Difficulty::Hard => DifficultyConfig {
                question_count: 25,
                timer_seconds: 7,
                pool: 50..ARTIST_POOL.len(),
                artists_sampled: 30,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Random subset of this tier's artist slice, capped at the slice size.
    pub fn sample_artists<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<&'static str> {
        let config = self.config();
        let slice = &ARTIST_POOL[config.pool.clone()];
        slice
            .choose_multiple(rng, config.artists_sampled.min(slice.len()))
            .copied()
            .collect()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty `{other}` (expected easy, medium or hard)")),
        }
    }
}

/// Artists and series ordered from most to least widely known.
///
/// `[0, 20)` are global icons, `[20, 50)` major hits and popular anime, the rest regional
/// stars, deep cuts and niche series.
pub const ARTIST_POOL: [&str; 105] = [
    // easy
    "Michael Jackson",
    "Beyoncé",
    "Rihanna",
    "Eminem",
    "Drake",
    "Taylor Swift",
    "Bruno Mars",
    "The Weeknd",
    "Whitney Houston",
    "Céline Dion",
    "Madonna",
    "Prince",
    "Adele",
    "Justin Bieber",
    "Shakira",
    "Dragon Ball Z",
    "One Piece",
    "Naruto",
    "Pokémon",
    "Lion King (Disney)",
    // medium
    "Kanye West",
    "Kendrick Lamar",
    "Jay-Z",
    "Snoop Dogg",
    "50 Cent",
    "Chris Brown",
    "Cardi B",
    "Travis Scott",
    "Future",
    "Ariana Grande",
    "Booba",
    "Damso",
    "Ninho",
    "Stromae",
    "Aya Nakamura",
    "Gims",
    "Soprano",
    "Orelsan",
    "Jul",
    "PNL",
    "Burna Boy",
    "Wizkid",
    "Davido",
    "Magic System",
    "Alpha Blondy",
    "Attack on Titan (Shingeki no Kyojin)",
    "Demon Slayer (Kimetsu no Yaiba)",
    "Sailor Moon",
    "Death Note",
    "My Hero Academia",
    // hard
    "Tupac Shakur",
    "Notorious B.I.G.",
    "Dr. Dre",
    "Lil Wayne",
    "Migos",
    "DaBaby",
    "Roddy Ricch",
    "Lil Baby",
    "Latto",
    "Giveon",
    "Dadju",
    "Tayc",
    "Nono la grinta",
    "SDM",
    "Joe Dwet Filé",
    "Naza",
    "Kiff No Beat",
    "Didi B",
    "Kaaris",
    "Fally Ipupa",
    "Rema",
    "Sarkodie",
    "Black Sherif",
    "Shatta Wale",
    "Osibisa",
    "DJ Arafat",
    "Tiken Jah Fakoly",
    "Meiway",
    "Manu Dibango",
    "Richard Bona",
    "Yannick Noah",
    "Locko",
    "Cysoul",
    "Tenor",
    "Petit Pays",
    "Neon Genesis Evangelion",
    "Cowboy Bebop",
    "Fullmetal Alchemist: Brotherhood",
    "Bleach",
    "Hunter x Hunter",
    "JoJo's Bizarre Adventure",
    "Jujutsu Kaisen",
    "Tokyo Ghoul",
    "Saint Seiya (Knights of the Zodiac)",
    "Captain Tsubasa",
    "City Hunter",
    "Code Geass",
    "Digimon",
    "GTO (Great Teacher Onizuka)",
    "Yu Yu Hakusho",
    "Fairy Tail",
    "Chainsaw Man",
    "Spy x Family",
    "Your Name (Kimi no Na wa)",
    "Studio Ghibli",
];

#[cfg(test)]
pub(crate) fn sample_question(correct_year: Year) -> Question {
    Question {
        artist: "Daft Punk".to_string(),
        song_title: "One More Time".to_string(),
        correct_year,
        options: vec![correct_year, correct_year + 1, correct_year + 2, correct_year + 3],
        lyrics_snippet: "One more time, we're gonna celebrate".to_string(),
        album: "Discovery".to_string(),
        release_date: format!("{correct_year}-11-13"),
        audio_url: None,
    }
}
