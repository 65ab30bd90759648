use clap::{Arg, ArgAction, Command};
use std::time::{Duration, Instant};
use urg_driver::{run_driver, CaptureMode, DriverConfig, UrgDevice, DEFAULT_PORT_NAME};

struct Args {
    port_name: String,
    baud_rate: u32,
    count: usize,
    fast: bool,
    threaded: bool,
}

fn get_args() -> Args {
    let matches = Command::new("URG data receiver.")
        .about("Reads range data from an URG device and prints it as JSON.")
        .disable_version_flag(true)
        .arg(
            Arg::new("port")
                .help("The device path to a serial port")
                .default_value(DEFAULT_PORT_NAME),
        )
        .arg(
            Arg::new("baud")
                .long("baud")
                .value_parser(clap::value_parser!(u32))
                .default_value("115200"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .help("Number of frames to read")
                .value_parser(clap::value_parser!(usize))
                .default_value("10"),
        )
        .arg(
            Arg::new("fast")
                .long("fast")
                .help("Keep the laser on between captures")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("threaded")
                .long("threaded")
                .help("Capture on a background thread")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    Args {
        port_name: matches.get_one::<String>("port").unwrap().to_string(),
        baud_rate: *matches.get_one::<u32>("baud").unwrap(),
        count: *matches.get_one::<usize>("count").unwrap(),
        fast: matches.get_flag("fast"),
        threaded: matches.get_flag("threaded"),
    }
}

fn main() {
    env_logger::init();
    let args = get_args();

    let config = DriverConfig::new(&args.port_name).baud_rate(args.baud_rate);
    let mut device = UrgDevice::open(&config).unwrap();

    for (key, value) in device.parameters().iter() {
        println!("{}: {}", key, value);
    }
    let geometry = device.geometry().clone();
    println!(
        "front index {} at {} rad, cycle {} s",
        geometry.front_index,
        geometry.angle_of(geometry.front_index),
        geometry.cycle_seconds()
    );

    let (start, stop) = (Some(200), Some(210));

    if args.threaded {
        let mode = if args.fast {
            CaptureMode::Fast { start, stop }
        } else {
            CaptureMode::Cold { start, stop }
        };
        let (driver_threads, frame_rx) = run_driver(device, mode).unwrap();
        for _ in 0..args.count {
            match frame_rx.recv_timeout(Duration::from_secs(1)) {
                Some(frame) => println!("{}", serde_json::to_string(&frame).unwrap()),
                None => break,
            }
        }
        drop(driver_threads);
        return;
    }

    if args.fast {
        device.prep_fast_capture(start, stop).unwrap();
    }
    let t0 = Instant::now();
    for _ in 0..args.count {
        let frame = if args.fast {
            device.fast_capture()
        } else {
            device.capture(start, stop)
        };
        println!("{}", serde_json::to_string(&frame).unwrap());
    }
    let elapsed = t0.elapsed().as_secs_f64();
    eprintln!(
        "{} frames in {:.3} s ({:.1} Hz)",
        args.count,
        elapsed,
        args.count as f64 / elapsed
    );

    device.disconnect();
}
