//! End-to-end streaming-engine scenarios against a simulated device peer: a plain
//! `std::net::TcpListener` driven from a background thread, exactly as a real device would drive
//! the protocol, per the corpus's own network integration-test style (no transport mocking trait).

use etherdream::codec::WriteToBytes;
use etherdream::config::PlayConfig;
use etherdream::control::Session;
use etherdream::engine::play;
use etherdream::point::Point;
use etherdream::status::StatusSnapshot;
use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::thread;

fn status_bytes(playback_state: u8, buffer_fullness: u16) -> Vec<u8> {
    let status = StatusSnapshot {
        protocol: 1,
        light_engine_state: 0,
        playback_state,
        source: 0,
        light_engine_flags: 0,
        playback_flags: 0,
        source_flags: 0,
        buffer_fullness,
        point_rate: 0,
        point_count: 0,
    };
    let mut buf = Vec::new();
    status.write_to_bytes(&mut buf).unwrap();
    buf
}

fn response(resp: u8, echoed: u8, status_bytes: &[u8]) -> Vec<u8> {
    let mut buf = vec![resp, echoed];
    buf.extend_from_slice(status_bytes);
    buf
}

fn read_opcode(stream: &mut TcpStream) -> u8 {
    let mut b = [0u8; 1];
    stream.read_exact(&mut b).unwrap();
    b[0]
}

fn send_hello(stream: &mut TcpStream, playback_state: u8, buffer_fullness: u16) {
    let hello = response(b'a', b'?', &status_bytes(playback_state, buffer_fullness));
    stream.write_all(&hello).unwrap();
    let op = read_opcode(stream);
    assert_eq!(op, b'v');
    let mut firmware = [0u8; 32];
    firmware[..8].copy_from_slice(b"LDV 1.00");
    stream.write_all(&firmware).unwrap();
}

fn expect_write_data(stream: &mut TcpStream, expected_count: u16) {
    let op = read_opcode(stream);
    assert_eq!(op, b'd');
    let mut count_bytes = [0u8; 2];
    stream.read_exact(&mut count_bytes).unwrap();
    let count = u16::from_le_bytes(count_bytes);
    assert_eq!(count, expected_count);
    let mut payload = vec![0u8; count as usize * 18];
    stream.read_exact(&mut payload).unwrap();
}

fn expect_begin(stream: &mut TcpStream) {
    let op = read_opcode(stream);
    assert_eq!(op, b'b');
    let mut params = [0u8; 6];
    stream.read_exact(&mut params).unwrap();
}

fn expect_ping(stream: &mut TcpStream) {
    let op = read_opcode(stream);
    assert_eq!(op, b'?');
}

fn accept(listener: TcpListener) -> (TcpStream, SocketAddr) {
    listener.accept().unwrap()
}

#[test]
fn clean_play_of_100_points_auto_prepares_and_begins() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let addr = listener.local_addr().unwrap();

    let peer = thread::spawn(move || {
        let (mut stream, _) = accept(listener);
        send_hello(&mut stream, 0, 0); // Idle, empty buffer -> engine must Prepare first

        let op = read_opcode(&mut stream);
        assert_eq!(op, b'p');
        stream.write_all(&response(b'a', b'p', &status_bytes(1, 0))).unwrap();

        expect_write_data(&mut stream, 100);
        stream.write_all(&response(b'a', b'd', &status_bytes(1, 0))).unwrap();

        expect_begin(&mut stream);
        stream.write_all(&response(b'a', b'b', &status_bytes(2, 0))).unwrap();
    });

    let session = Session::connect(addr).unwrap();
    let config = PlayConfig::default().with_buffer_capacity(1799).with_frame_points(100);

    let summary = play(&session, config, |mut writer| {
        for i in 0..100i16 {
            let p = Point::new(i, -i, 100, 200, 50);
            writer.write_all(&p.encode()).unwrap();
        }
    })
    .unwrap();

    assert_eq!(summary.points_played, 100);
    assert!(summary.began);
    peer.join().unwrap();
}

#[test]
fn a_stream_shorter_than_one_frame_still_flushes_its_trailing_partial_chunk() {
    // Default config: frame_points() derives to scan_rate/frame_rate = 24000/30 = 800, so a
    // 100-point generator closes well inside the engine's first fixed-size chunk read. The
    // partial bytes already pulled off the pipe before EOF must still be written, not dropped.
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let addr = listener.local_addr().unwrap();

    let peer = thread::spawn(move || {
        let (mut stream, _) = accept(listener);
        send_hello(&mut stream, 0, 0); // Idle, empty buffer -> engine must Prepare first

        let op = read_opcode(&mut stream);
        assert_eq!(op, b'p');
        stream.write_all(&response(b'a', b'p', &status_bytes(1, 0))).unwrap();

        expect_write_data(&mut stream, 100);
        stream.write_all(&response(b'a', b'd', &status_bytes(1, 0))).unwrap();

        expect_begin(&mut stream);
        stream.write_all(&response(b'a', b'b', &status_bytes(2, 0))).unwrap();
    });

    let session = Session::connect(addr).unwrap();
    let config = PlayConfig::default();
    assert_eq!(config.frame_points(), 800);

    let summary = play(&session, config, |mut writer| {
        for i in 0..100i16 {
            let p = Point::new(i, -i, 100, 200, 50);
            writer.write_all(&p.encode()).unwrap();
        }
    })
    .unwrap();

    assert_eq!(summary.points_played, 100);
    assert!(summary.began);
    peer.join().unwrap();
}

#[test]
fn play_withholds_writes_until_backpressure_clears() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let addr = listener.local_addr().unwrap();

    // buffer_capacity=200, frame_points=50 -> threshold = 150.
    let peer = thread::spawn(move || {
        let (mut stream, _) = accept(listener);
        send_hello(&mut stream, 1, 200); // already Prepared, buffer completely full

        // free = 0 <= 150 on each of these: engine must only Ping, never WriteData, until
        // fullness drops enough that free > threshold.
        for fullness in [200u16, 100] {
            expect_ping(&mut stream);
            stream.write_all(&response(b'a', b'?', &status_bytes(1, fullness))).unwrap();
        }
        expect_ping(&mut stream);
        stream.write_all(&response(b'a', b'?', &status_bytes(1, 20))).unwrap(); // free = 180 > 150

        expect_write_data(&mut stream, 50);
        stream.write_all(&response(b'a', b'd', &status_bytes(1, 70))).unwrap();

        expect_begin(&mut stream);
        stream.write_all(&response(b'a', b'b', &status_bytes(2, 70))).unwrap();

        // Post-begin: free = 130 <= 150 once more, then the device reports itself drained and
        // the engine discovers end-of-stream on its next pipe read instead of writing again.
        expect_ping(&mut stream);
        stream.write_all(&response(b'a', b'?', &status_bytes(2, 0))).unwrap();
    });

    let session = Session::connect(addr).unwrap();
    let config = PlayConfig::default().with_buffer_capacity(200).with_frame_points(50);

    let summary = play(&session, config, |mut writer| {
        for i in 0..50i16 {
            let p = Point::new(i, i, 0, 255, 0);
            writer.write_all(&p.encode()).unwrap();
        }
    })
    .unwrap();

    assert_eq!(summary.points_played, 50);
    assert!(summary.began);
    peer.join().unwrap();
}

#[test]
fn nak_full_is_recovered_by_pinging_then_retrying_the_same_chunk() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let addr = listener.local_addr().unwrap();

    let peer = thread::spawn(move || {
        let (mut stream, _) = accept(listener);
        send_hello(&mut stream, 1, 0); // Prepared, room to spare: no auto-Prepare, no backpressure

        expect_write_data(&mut stream, 50);
        stream.write_all(&response(b'F', b'd', &status_bytes(1, 200))).unwrap(); // NAK-Full

        expect_ping(&mut stream);
        stream.write_all(&response(b'a', b'?', &status_bytes(1, 0))).unwrap();

        // Same chunk retried, this time accepted.
        expect_write_data(&mut stream, 50);
        stream.write_all(&response(b'a', b'd', &status_bytes(1, 50))).unwrap();

        expect_begin(&mut stream);
        stream.write_all(&response(b'a', b'b', &status_bytes(2, 50))).unwrap();

        expect_ping(&mut stream);
        stream.write_all(&response(b'a', b'?', &status_bytes(2, 0))).unwrap();
    });

    let session = Session::connect(addr).unwrap();
    let config = PlayConfig::default().with_buffer_capacity(200).with_frame_points(50);

    let summary = play(&session, config, |mut writer| {
        for i in 0..50i16 {
            let p = Point::new(i, 0, 10, 10, 10);
            writer.write_all(&p.encode()).unwrap();
        }
    })
    .unwrap();

    assert_eq!(summary.points_played, 50);
    assert!(summary.began);
    peer.join().unwrap();
}

#[test]
fn play_skips_prepare_when_already_playing() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let addr = listener.local_addr().unwrap();

    let peer = thread::spawn(move || {
        let (mut stream, _) = accept(listener);
        send_hello(&mut stream, 2, 0); // already Playing

        // No Prepare expected. First command must be WriteData.
        expect_write_data(&mut stream, 10);
        stream.write_all(&response(b'a', b'd', &status_bytes(2, 0))).unwrap();

        expect_begin(&mut stream);
        stream.write_all(&response(b'a', b'b', &status_bytes(2, 0))).unwrap();
    });

    let session = Session::connect(addr).unwrap();
    let config = PlayConfig::default().with_buffer_capacity(1799).with_frame_points(10);

    let summary = play(&session, config, |mut writer| {
        for i in 0..10i16 {
            writer.write_all(&Point::new(i, i, 1, 1, 1).encode()).unwrap();
        }
    })
    .unwrap();

    assert_eq!(summary.points_played, 10);
    peer.join().unwrap();
}
