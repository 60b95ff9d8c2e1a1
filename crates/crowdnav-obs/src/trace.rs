//! State trace recording and playback.
//!
//! A trace is the textual telemetry form of an episode: a header line,
//! then one frame per tick. Each frame is a marker line
//! (`tick <n> humans <h> obstacles <o>`) followed by one state line per
//! record — the robot's full state, then the pedestrians in agent-index
//! order, then the obstacles. State lines use the declared-field-order
//! format from [`crowdnav_core::text`].
//!
//! [`TraceWriter`] streams frames to any `Write` sink;
//! [`TraceReader`] reads them back, re-validating every record through
//! the parsing constructors.

use std::io::{BufRead, Write};

use crowdnav_core::{FullState, JointState, ObservableState, ObstacleState, TickId};

use crate::error::TraceError;

const HEADER: &str = "crowdnav-trace v1";

/// One decoded trace frame: the tick and its snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceFrame {
    /// The tick this snapshot was produced at.
    pub tick: TickId,
    /// The reconstructed snapshot.
    pub state: JointState,
}

/// Writes state traces to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production code
/// can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use crowdnav_core::{FullState, JointState, TickId};
/// use crowdnav_obs::{TraceReader, TraceWriter};
///
/// let robot = FullState::new(0.0, 0.0, 0.0, 0.0, 0.3, 0.2, 5.0, 5.0, 1.0).unwrap();
/// let state = JointState::without_obstacles(robot, vec![]);
///
/// let mut buf = Vec::new();
/// let mut writer = TraceWriter::new(&mut buf).unwrap();
/// writer.write_frame(TickId(0), &state).unwrap();
/// writer.write_frame(TickId(1), &state).unwrap();
/// assert_eq!(writer.frames_written(), 2);
/// drop(writer);
///
/// let mut reader = TraceReader::open(buf.as_slice()).unwrap();
/// let f0 = reader.next_frame().unwrap().unwrap();
/// assert_eq!(f0.tick, TickId(0));
/// assert_eq!(f0.state, state);
/// assert!(reader.next_frame().unwrap().is_some());
/// assert!(reader.next_frame().unwrap().is_none());
/// ```
pub struct TraceWriter<W: Write> {
    writer: W,
    frames_written: u64,
}

impl<W: Write> TraceWriter<W> {
    /// Create a new trace writer, immediately writing the header line.
    pub fn new(mut writer: W) -> Result<Self, TraceError> {
        writeln!(writer, "{HEADER}")?;
        Ok(Self {
            writer,
            frames_written: 0,
        })
    }

    /// Record one frame: the marker line, then one line per state record.
    pub fn write_frame(&mut self, tick: TickId, state: &JointState) -> Result<(), TraceError> {
        writeln!(
            self.writer,
            "tick {} humans {} obstacles {}",
            tick,
            state.human_states().len(),
            state.obstacle_states().len(),
        )?;
        writeln!(self.writer, "{}", state.self_state())?;
        for h in state.human_states() {
            writeln!(self.writer, "{h}")?;
        }
        for o in state.obstacle_states() {
            writeln!(self.writer, "{o}")?;
        }
        self.frames_written += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), TraceError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Consume the writer and return the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Reads state traces from a byte stream, re-validating each record.
#[derive(Debug)]
pub struct TraceReader<R: BufRead> {
    reader: R,
    line_no: usize,
}

impl<R: BufRead> TraceReader<R> {
    /// Open a trace, consuming and checking the header line.
    pub fn open(mut reader: R) -> Result<Self, TraceError> {
        let mut line = String::new();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            return Err(TraceError::InvalidHeader { found: None });
        }
        if line.trim_end() != HEADER {
            return Err(TraceError::InvalidHeader {
                found: Some(line.trim_end().to_string()),
            });
        }
        Ok(Self { reader, line_no: 1 })
    }

    /// Read the next frame, or `None` at end of stream.
    pub fn next_frame(&mut self) -> Result<Option<TraceFrame>, TraceError> {
        let marker = match self.next_line()? {
            Some(line) => line,
            None => return Ok(None),
        };
        let (tick, humans, obstacles) = self.parse_marker(&marker)?;

        let self_state: FullState = self.parse_state_line()?;
        let mut human_states = Vec::with_capacity(humans);
        for _ in 0..humans {
            human_states.push(self.parse_state_line::<ObservableState>()?);
        }
        let mut obstacle_states = Vec::with_capacity(obstacles);
        for _ in 0..obstacles {
            obstacle_states.push(self.parse_state_line::<ObstacleState>()?);
        }

        Ok(Some(TraceFrame {
            tick,
            state: JointState::new(self_state, human_states, obstacle_states),
        }))
    }

    fn next_line(&mut self) -> Result<Option<String>, TraceError> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = self.reader.read_line(&mut line)?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let trimmed = line.trim_end();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    fn parse_marker(&self, line: &str) -> Result<(TickId, usize, usize), TraceError> {
        let malformed = |detail: String| TraceError::MalformedFrame {
            line: self.line_no,
            detail,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["tick", t, "humans", h, "obstacles", o] => {
                let tick = t
                    .parse::<u64>()
                    .map_err(|_| malformed(format!("bad tick '{t}'")))?;
                let humans = h
                    .parse::<usize>()
                    .map_err(|_| malformed(format!("bad human count '{h}'")))?;
                let obstacles = o
                    .parse::<usize>()
                    .map_err(|_| malformed(format!("bad obstacle count '{o}'")))?;
                Ok((TickId(tick), humans, obstacles))
            }
            _ => Err(malformed(format!("unrecognized marker '{line}'"))),
        }
    }

    fn parse_state_line<T: std::str::FromStr<Err = crowdnav_core::ParseError>>(
        &mut self,
    ) -> Result<T, TraceError> {
        let line = self.next_line()?.ok_or(TraceError::MalformedFrame {
            line: self.line_no,
            detail: "stream ended mid-frame".into(),
        })?;
        line.parse().map_err(|source| TraceError::BadStateLine {
            line: self.line_no,
            source,
        })
    }
}
