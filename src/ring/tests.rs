use super::*;
use crate::error::{AppError, AppResult};

#[test]
fn head_changes_accumulate_and_advance_starts_empty() -> AppResult<()> {
    let mut ring = RingBuffer::new();
    if ring.capacity() != 60 {
        return Err(AppError::validation("Expected 60 slots"));
    }

    ring.add_to_head(4);
    ring.add_to_head(7);
    if ring.value() != 11 {
        return Err(AppError::validation(format!(
            "Expected head value 11, got {}",
            ring.value()
        )));
    }

    ring.advance_head();
    if ring.value() != 0 {
        return Err(AppError::validation("Expected fresh slot after advance"));
    }

    ring.increment_head();
    ring.increment_head();
    if ring.value() != 2 {
        return Err(AppError::validation("Expected two increments on slot 1"));
    }
    Ok(())
}

#[test]
fn advance_by_full_cycle_keeps_contents() -> AppResult<()> {
    let mut ring = RingBuffer::new();
    for index in 0..SLOTS {
        ring.add_at(index, i64::try_from(index).unwrap_or(0));
    }
    ring.advance_head_by(7);
    let before = ring.clone();

    ring.advance_head_by(SLOTS);
    if ring != before {
        return Err(AppError::validation("Full cycle changed the buffer"));
    }

    ring.advance_head_by(SLOTS - 1);
    ring.advance_head();
    if ring != before {
        return Err(AppError::validation("Wrap through 59 -> 0 changed the buffer"));
    }
    Ok(())
}

#[test]
fn at_functions_wrap_index() -> AppResult<()> {
    let mut ring = RingBuffer::new();
    ring.increment_at(2);
    ring.increment_at(2);
    ring.increment_at(62);
    ring.add_at(3, 7);
    ring.add_at(3, 7);

    ring.advance_head();
    if ring.value() != 0 {
        return Err(AppError::validation("Slot 1 should be empty"));
    }
    ring.advance_head();
    if ring.value() != 3 {
        return Err(AppError::validation(format!(
            "Slot 2 should hold 3, got {}",
            ring.value()
        )));
    }
    ring.advance_head();
    if ring.value() != 14 {
        return Err(AppError::validation("Slot 3 should hold 14"));
    }
    Ok(())
}

#[test]
fn relative_reads_wrap_both_directions() -> AppResult<()> {
    let mut ring = RingBuffer::new();
    ring.add_at(59, 5);
    ring.add_at(0, 1);
    ring.add_at(1, 2);

    if ring.value_at_relative(0) != ring.value_at(ring.head()) {
        return Err(AppError::validation("Offset 0 must read the head"));
    }
    if ring.value_at_relative(-1) != 5 {
        return Err(AppError::validation("Offset -1 from slot 0 must read slot 59"));
    }
    if ring.previous_value() != 5 {
        return Err(AppError::validation("previous_value must match offset -1"));
    }
    if ring.value_at_relative(1) != 2 {
        return Err(AppError::validation("Offset +1 must read slot 1"));
    }

    ring.advance_head_by(59);
    if ring.value_at_relative(1) != 1 {
        return Err(AppError::validation("Offset +1 from slot 59 must read slot 0"));
    }
    if ring.value_at_relative(-121) != ring.value_at(58) {
        return Err(AppError::validation("Large negative offsets must wrap"));
    }
    Ok(())
}

#[test]
fn sum_of_previous_n_excludes_head() -> AppResult<()> {
    let mut ring = RingBuffer::starting_at(2);
    ring.add_at(0, 10);
    ring.add_at(1, 20);
    ring.add_at(2, 1000);
    ring.add_at(59, 3);

    if ring.sum_of_previous_n(1) != 20 {
        return Err(AppError::validation("Previous 1 must be slot 1"));
    }
    if ring.sum_of_previous_n(3) != 33 {
        return Err(AppError::validation(format!(
            "Previous 3 must wrap to slot 59, got {}",
            ring.sum_of_previous_n(3)
        )));
    }
    if ring.sum_of_previous_n(0) != 0 {
        return Err(AppError::validation("Previous 0 must be empty"));
    }
    Ok(())
}

#[test]
fn sum_of_previous_sixty_covers_every_slot() -> AppResult<()> {
    let mut ring = RingBuffer::starting_at(17);
    let mut expected = 0i64;
    for index in [0usize, 5, 17, 18, 42, 59, 120, 77] {
        let value = i64::try_from(index).unwrap_or(0).saturating_add(1);
        ring.add_at(index, value);
        expected = expected.saturating_add(value);
    }
    let all: i64 = ring.as_slots().iter().sum();
    if ring.sum_of_previous_n(SLOTS) != all || all != expected {
        return Err(AppError::validation(format!(
            "Expected {} from every slot, got {}",
            expected,
            ring.sum_of_previous_n(SLOTS)
        )));
    }
    if ring.sum_of_previous_n(500) != all {
        return Err(AppError::validation("Oversized windows clamp to 60"));
    }
    Ok(())
}

#[test]
fn tick_clears_the_slot_ahead() -> AppResult<()> {
    let mut ring = RingBuffer::new();
    for index in 0..SLOTS {
        ring.add_at(index, 9);
    }

    ring.tick();
    if ring.head() != 1 {
        return Err(AppError::validation("Tick must advance the head"));
    }
    if ring.value() != 9 {
        return Err(AppError::validation("New head keeps its count"));
    }
    if ring.value_at(2) != 0 {
        return Err(AppError::validation("Slot ahead of the head must be zeroed"));
    }
    if ring.value_at(3) != 9 {
        return Err(AppError::validation("Only one slot is cleared per tick"));
    }
    Ok(())
}

#[test]
fn full_cycle_of_ticks_clears_each_slot_once() -> AppResult<()> {
    let mut ring = RingBuffer::new();
    for index in 0..SLOTS {
        ring.add_at(index, 1);
    }
    for _ in 0..SLOTS {
        ring.tick();
        ring.increment_head();
    }
    // Each slot was cleared once before the head landed on it again; the
    // slot ahead of the final head has just been cleared for the next lap.
    for (index, value) in ring.as_slots().iter().enumerate() {
        let expected = if index == 1 { 0 } else { 1 };
        if *value != expected {
            return Err(AppError::validation(format!(
                "Slot {} expected {}, got {}",
                index, expected, value
            )));
        }
    }
    Ok(())
}

#[test]
fn sync_to_walks_and_clears_missed_seconds() -> AppResult<()> {
    let mut ring = RingBuffer::starting_at(58);
    for index in 0..SLOTS {
        ring.add_at(index, 4);
    }

    let steps = ring.sync_to(2);
    if steps != 4 || ring.head() != 2 {
        return Err(AppError::validation(format!(
            "Expected 4 steps to second 2, got {} (head {})",
            steps,
            ring.head()
        )));
    }
    for cleared in [0usize, 1, 2, 3] {
        if ring.value_at(cleared) != 0 {
            return Err(AppError::validation(format!(
                "Slot {} should have been cleared",
                cleared
            )));
        }
    }
    if ring.value_at(59) != 4 || ring.value_at(4) != 4 {
        return Err(AppError::validation("Slots outside the walk keep counts"));
    }
    if ring.sync_to(62) != 0 {
        return Err(AppError::validation("Second 62 wraps to the current head"));
    }
    Ok(())
}

#[test]
fn max_is_never_negative() -> AppResult<()> {
    let mut ring = RingBuffer::new();
    if ring.max() != 0 {
        return Err(AppError::validation("Empty max must be 0"));
    }
    ring.add_at(4, -3);
    ring.add_at(8, 12);
    ring.add_at(9, 11);
    if ring.max() != 12 {
        return Err(AppError::validation("Expected max 12"));
    }
    Ok(())
}
