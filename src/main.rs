//! `termframe` binary: inspect recordings and dump their fragments.

mod cli;

use std::{error::Error, process::ExitCode};

use clap::Parser;
use cli::{Cli, Command, DumpArgs, RecordingArgs};
use termframe::{
    Fragment,
    RecordingDescriptor,
    ReplayFragmentReader,
    ReplayRange,
    position::ConfigurationError,
};

fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Describe(args) => describe(&args),
        Command::Dump(args) => dump(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("termframe: {err}");
            ExitCode::FAILURE
        }
    }
}

fn describe(args: &RecordingArgs) -> Result<(), Box<dyn Error>> {
    let descriptor = RecordingDescriptor::load(&args.archive_dir, args.recording_id)?;
    let codec = descriptor.validate()?;
    println!("recording_id:        {}", descriptor.recording_id);
    println!("session_id:          {}", descriptor.session_id);
    println!("stream_id:           {}", descriptor.stream_id);
    println!("term_buffer_length:  {}", descriptor.term_buffer_length);
    println!("position_bits_shift: {}", codec.position_bits_to_shift());
    println!("initial_term_id:     {}", descriptor.initial_term_id);
    println!("initial_term_offset: {}", descriptor.initial_term_offset);
    println!("segment_file_length: {}", descriptor.segment_file_length);
    println!("terms_per_segment:   {}", descriptor.terms_per_segment());
    println!("start_position:      {}", descriptor.start_position());
    println!("stop_position:       {}", descriptor.stop_position());
    Ok(())
}

fn dump(args: &DumpArgs) -> Result<(), Box<dyn Error>> {
    if args.fragment_limit == 0 {
        return Err(ConfigurationError::ZeroFragmentLimit.into());
    }
    let RecordingArgs {
        archive_dir,
        recording_id,
    } = &args.recording;
    let descriptor = RecordingDescriptor::load(archive_dir, *recording_id)?;
    let range = match (args.term_id, args.term_offset, args.length) {
        (Some(term_id), Some(term_offset), Some(length)) => ReplayRange {
            term_id,
            term_offset,
            length,
        },
        _ => ReplayRange::whole(&descriptor),
    };
    let mut reader = ReplayFragmentReader::with_descriptor(archive_dir, descriptor, range)?;

    let mut print = |fragment: &Fragment<'_>| {
        let header = fragment.header();
        println!(
            "term_id={} term_offset={} type={:?} flags={} session_id={} stream_id={} length={}",
            header.term_id(),
            fragment.frame_offset(),
            header.frame_type(),
            header.flags(),
            header.session_id(),
            header.stream_id(),
            fragment.len()
        );
        true
    };
    let mut fragments = 0;
    while !reader.is_done() {
        fragments += reader.controlled_poll(&mut print, args.fragment_limit)?;
    }
    reader.close();
    println!("{fragments} fragments, {} bytes", reader.transmitted());
    Ok(())
}
