//! Recording fakes and wire builders shared by the engine tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use ril_engine::{
    AudioControl, CommandExecutor, ExecError, Ril, RilConfig, Transport, TransportError,
};
use ril_protocol::{ParcelWriter, WireCursor, RESPONSE_SOLICITED, RESPONSE_UNSOLICITED};

/// Transport that records every request it is given.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<Vec<u8>>>,
    pub fail: Mutex<bool>,
}

impl RecordingTransport {
    /// `(code, serial)` of every request sent, in order.
    pub fn headers(&self) -> Vec<(i32, i32)> {
        self.sent
            .lock()
            .iter()
            .map(|data| {
                let mut cursor = WireCursor::new(data);
                (cursor.read_i32().unwrap(), cursor.read_i32().unwrap())
            })
            .collect()
    }

    /// Body of the `n`th request, past its header.
    pub fn body(&self, n: usize) -> Vec<u8> {
        self.sent.lock()[n][8..].to_vec()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        if *self.fail.lock() {
            return Err(TransportError::Io("link down".to_string()));
        }
        self.sent.lock().push(data.to_vec());
        Ok(())
    }
}

/// Audio collaborator that records parameters.
#[derive(Default)]
pub struct RecordingAudio {
    pub parameters: Mutex<Vec<(String, String)>>,
}

impl AudioControl for RecordingAudio {
    fn set_parameter(&self, key: &str, value: &str) {
        self.parameters
            .lock()
            .push((key.to_string(), value.to_string()));
    }
}

/// Executor that records commands and optionally fails them.
#[derive(Default)]
pub struct RecordingExecutor {
    pub commands: Mutex<Vec<String>>,
    pub fail: Mutex<bool>,
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, command: &str) -> Result<(), ExecError> {
        self.commands.lock().push(command.to_string());
        if *self.fail.lock() {
            return Err(ExecError::Launch {
                command: command.to_string(),
                reason: "not permitted".to_string(),
            });
        }
        Ok(())
    }
}

/// An engine wired to recording fakes.
pub struct Harness {
    pub ril: Ril,
    pub transport: Arc<RecordingTransport>,
    pub audio: Arc<RecordingAudio>,
    pub executor: Arc<RecordingExecutor>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(RilConfig::default())
    }

    pub fn with_config(config: RilConfig) -> Self {
        let transport = Arc::new(RecordingTransport::default());
        let audio = Arc::new(RecordingAudio::default());
        let executor = Arc::new(RecordingExecutor::default());
        let ril = Ril::new(config, transport.clone(), audio.clone(), executor.clone());
        Self {
            ril,
            transport,
            audio,
            executor,
        }
    }
}

/// `[0][serial][error]<body>`
pub fn solicited(serial: i32, error: i32, body: &[u8]) -> Vec<u8> {
    let mut data = ParcelWriter::new();
    data.write_i32(RESPONSE_SOLICITED)
        .write_i32(serial)
        .write_i32(error);
    let mut data = data.into_vec();
    data.extend_from_slice(body);
    data
}

/// `[1][event]<body>`
pub fn unsolicited(event: i32, body: &[u8]) -> Vec<u8> {
    let mut data = ParcelWriter::new();
    data.write_i32(RESPONSE_UNSOLICITED).write_i32(event);
    let mut data = data.into_vec();
    data.extend_from_slice(body);
    data
}

pub fn ints(values: &[i32]) -> Vec<u8> {
    let mut w = ParcelWriter::new();
    w.write_ints(values);
    w.into_vec()
}

pub fn strings(values: &[Option<&str>]) -> Vec<u8> {
    let mut w = ParcelWriter::new();
    w.write_strings(values);
    w.into_vec()
}

pub fn string(value: Option<&str>) -> Vec<u8> {
    let mut w = ParcelWriter::new();
    w.write_string(value);
    w.into_vec()
}

/// Append one call list entry without a UUS block.
pub fn write_call(w: &mut ParcelWriter, state: i32, index: i32, privacy: bool, number: &str) {
    w.write_i32(state)
        .write_i32(index)
        .write_i32(0x81)
        .write_bool(false)
        .write_bool(false)
        .write_i32(0)
        .write_bool(true)
        .write_i32(0)
        .write_i32(0)
        .write_i32(0)
        .write_string(None)
        .write_bool(privacy)
        .write_str(number)
        .write_i32(0)
        .write_string(None)
        .write_i32(0)
        .write_i32(0);
}
