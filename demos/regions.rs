use std::{alloc::Layout, io::Read};

use fixalloc::{BumpAllocator, RecyclingAllocator, RegionAllocator, TaggedAllocator};
use libc::sbrk;

/// Waits until the user presses ENTER when the demo runs with `--step`.
/// Useful when you want to inspect memory state with tools like `pmap` or
/// `gdb` between steps.
fn block_until_enter_pressed(step: bool) {
  if step {
    println!("\n>>> Press ENTER to continue...");
    let _ = std::io::stdin().bytes().next();
  }
}

/// Prints the current program break using `sbrk(0)`.
/// None of the allocators should ever move it.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn print_alloc<'a>(
  allocator: &impl RegionAllocator<'a>,
  label: &str,
  allocation: &fixalloc::Allocation,
) {
  println!(
    "[{}] {} bytes at offset {} (address {:#X}), {} of {} bytes used",
    label,
    allocation.len(),
    allocation.offset(),
    allocator.address(allocation),
    allocator.used(),
    allocator.capacity(),
  );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  env_logger::init();

  let step = std::env::args().any(|arg| arg == "--step");
  let mut buffer = [0u8; 256];

  print_program_break("start");
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 1) Bump: every allocation moves the cursor, release does nothing.
  // --------------------------------------------------------------------
  {
    let mut bump = BumpAllocator::new(&mut buffer);

    let word = bump.allocate(Layout::new::<u32>())?;
    bump.bytes_mut(&word).unwrap().copy_from_slice(&0xDEADBEEFu32.to_ne_bytes());
    print_alloc(&bump, "bump u32", &word);

    let odd = bump.allocate_bytes(&[0xAB; 12])?;
    print_alloc(&bump, "bump [u8; 12]", &odd);

    let wide = bump.allocate(Layout::new::<u64>())?;
    print_alloc(&bump, "bump u64", &wide);
    println!("[bump u64] address % align = {}", bump.address(&wide) % 8);

    bump.release(word);
    let after = bump.allocate(Layout::array::<u8>(2)?)?;
    print_alloc(&bump, "bump after release", &after);
  }
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 2) Tagged: headers in front of every payload, release flips a flag.
  // --------------------------------------------------------------------
  {
    let mut tagged = TaggedAllocator::new(&mut buffer);

    let first = tagged.allocate(Layout::new::<u32>())?;
    print_alloc(&tagged, "tagged u32", &first);

    tagged.release(first);
    println!("[tagged] header after release = {:?}", tagged.header(&first));

    let second = tagged.allocate(Layout::array::<u8>(2)?)?;
    print_alloc(&tagged, "tagged after release", &second);
  }
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 3) Recycling: released blocks are found again by a first-fit scan.
  // --------------------------------------------------------------------
  {
    let mut recycling = RecyclingAllocator::new(&mut buffer);

    let first = recycling.allocate(Layout::new::<u32>())?;
    let array = recycling.allocate(Layout::array::<u16>(16)?)?;
    print_alloc(&recycling, "recycling u32", &first);
    print_alloc(&recycling, "recycling [u16; 16]", &array);

    recycling.release(first);
    let reused = recycling.allocate(Layout::array::<u8>(2)?)?;
    print_alloc(&recycling, "recycling [u8; 2]", &reused);
    println!(
      "[recycling] reused == first? {}",
      if reused.offset() == first.offset() {
        "Yes, it reused the freed block"
      } else {
        "No, it allocated somewhere else"
      }
    );

    for (offset, header) in recycling.blocks() {
      println!("[recycling] block at {:>3}: {:?}", offset, header);
    }

    match recycling.allocate(Layout::array::<u8>(1024)?) {
      Ok(_) => println!("[recycling] unexpectedly fit 1 KiB"),
      Err(error) => println!("[recycling] {}", error),
    }
  }

  print_program_break("end");
  println!("\nEnd of example. The buffer lived on the stack the whole time.");

  Ok(())
}
