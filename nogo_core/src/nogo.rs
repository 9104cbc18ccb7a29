use super::error::{Error, Result};
use super::interface::{Game, Illegal, Move, Player};
use std::fmt::Display;

pub struct NoGo;

/// Board size used by tournaments.
pub const DEFAULT_SIZE: usize = 9;
/// Columns are lettered `a` to `z`.
pub const MAX_SIZE: usize = 26;

/// Check a board size before building boards from it.
pub fn check_size(size: usize) -> Result<()> {
    if !(1..=MAX_SIZE).contains(&size) {
        return Err(Error::InvalidBoardSize(size));
    }
    Ok(())
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Player>>,
}
//   0   1   2  ...
//   n n+1 n+2  ...
// ...
// cell = row * size + col

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl Board {
    pub fn new(size: usize) -> Self {
        assert!(
            (1..=MAX_SIZE).contains(&size),
            "board size out of range, should between 1..=26"
        );
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Build a board from text rows: `X` black, `O` white, anything else empty.
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut board = Self::new(rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_bytes();
            assert_eq!(line.len(), board.size, "row {} has the wrong width", row);
            for (col, c) in line.iter().enumerate() {
                board.cells[row * board.size + col] = match c {
                    b'X' => Some(Player::Black),
                    b'O' => Some(Player::White),
                    _ => None,
                };
            }
        }
        board
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, position: usize) -> Option<Player> {
        self.cells.get(position).copied().flatten()
    }

    pub fn stones(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn get_coord(&self, position: usize) -> (usize, usize) {
        // row, col
        (position / self.size, position % self.size)
    }

    /// Column letter followed by row number, e.g. `c3`.
    pub fn notation(&self, position: usize) -> String {
        let (row, col) = self.get_coord(position);
        format!("{}{}", (col as u8 + b'a') as char, row)
    }

    /// Parse `c3` or `c 3` back into a cell index.
    pub fn parse_position(&self, text: &str) -> Result<usize> {
        let text = text.trim().to_lowercase();
        let mut chars = text.chars();
        let col = chars
            .next()
            .filter(char::is_ascii_lowercase)
            .map(|c| (c as u8 - b'a') as usize);
        let row = chars.as_str().trim().parse::<usize>().ok();
        match (row, col) {
            (Some(row), Some(col)) if row < self.size && col < self.size => {
                Ok(row * self.size + col)
            }
            _ => Err(Error::InvalidCoordinate(text)),
        }
    }

    fn neighbors(&self, position: usize) -> impl Iterator<Item = usize> {
        let size = self.size;
        let (row, col) = (position / size, position % size);
        [
            (row > 0).then(|| position - size),
            (row + 1 < size).then(|| position + size),
            (col > 0).then(|| position - 1),
            (col + 1 < size).then(|| position + 1),
        ]
        .into_iter()
        .flatten()
    }

    // Flood fill over the group containing `start`, stopping at the first empty neighbor.
    fn has_liberty(&self, start: usize) -> bool {
        let Some(color) = self.cells[start] else {
            return true;
        };
        let mut visited = vec![false; self.cells.len()];
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(pos) = stack.pop() {
            for next in self.neighbors(pos) {
                match self.cells[next] {
                    None => return true,
                    Some(c) if c == color && !visited[next] => {
                        visited[next] = true;
                        stack.push(next);
                    }
                    _ => {}
                }
            }
        }
        false
    }

    fn place(&mut self, m: &Move) -> std::result::Result<(), Illegal> {
        if m.position >= self.cells.len() {
            return Err(Illegal::OutOfBounds);
        }
        if self.cells[m.position].is_some() {
            return Err(Illegal::Occupied);
        }

        self.cells[m.position] = Some(m.player);
        let opponent = Some(m.player.opponent());
        let captures = self
            .neighbors(m.position)
            .any(|n| self.cells[n] == opponent && !self.has_liberty(n));
        let verdict = if captures {
            Err(Illegal::Capture)
        } else if !self.has_liberty(m.position) {
            Err(Illegal::Suicide)
        } else {
            Ok(())
        };
        if verdict.is_err() {
            self.cells[m.position] = None;
        }
        verdict
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  ")?;
        for col in 0..self.size {
            write!(f, " {}", (col as u8 + b'a') as char)?;
        }
        writeln!(f)?;
        for (row, line) in self.cells.chunks(self.size).enumerate() {
            write!(f, "{:2} ", row)?;
            for stone in line {
                write!(
                    f,
                    "{}",
                    match stone {
                        Some(Player::Black) => "X ",
                        Some(Player::White) => "O ",
                        None => "_ ",
                    }
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Game for NoGo {
    type S = Board;

    fn cell_count(state: &Self::S) -> usize {
        state.cells.len()
    }

    fn apply(state: &mut Self::S, m: &Move) -> std::result::Result<(), Illegal> {
        state.place(m)
    }

    // perfomance concern: place and lift on one scratch board instead of cloning per cell
    fn generate_moves(state: &Self::S, player: Player, moves: &mut Vec<usize>) {
        moves.clear();
        let mut scratch = state.clone();
        for pos in 0..scratch.cells.len() {
            if scratch.place(&Move::new(pos, player)).is_ok() {
                scratch.cells[pos] = None;
                moves.push(pos);
            }
        }
    }

    fn notation(state: &Self::S, position: usize) -> String {
        state.notation(position)
    }
}
