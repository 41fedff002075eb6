use super::*;
use crate::error::{AppError, AppResult};
use crate::test_support::{recv_within, run_async_test};
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;

const SETTLE: Duration = Duration::from_millis(50);

#[test]
fn every_subscriber_receives_one_copy() -> AppResult<()> {
    run_async_test(async {
        let (tx, broadcast) = Broadcast::<String>::channel(4);
        let (_first_tx, mut first) = broadcast.subscribe(4);

        tx.send("hi mom".to_owned())
            .await
            .map_err(|err| AppError::validation(format!("send failed: {}", err)))?;
        if recv_within(&mut first).await? != "hi mom" {
            return Err(AppError::validation("Unexpected first message"));
        }

        let (_second_tx, mut second) = broadcast.subscribe(4);
        let (_third_tx, mut third) = broadcast.subscribe(4);
        tx.send("happy birthday".to_owned())
            .await
            .map_err(|err| AppError::validation(format!("send failed: {}", err)))?;
        for rx in [&mut first, &mut second, &mut third] {
            if recv_within(rx).await? != "happy birthday" {
                return Err(AppError::validation("Subscriber missed the broadcast"));
            }
        }

        tokio::time::sleep(SETTLE).await;
        for rx in [&mut first, &mut second, &mut third] {
            if !matches!(rx.try_recv(), Err(TryRecvError::Empty)) {
                return Err(AppError::validation("Subscriber received a duplicate"));
            }
        }
        Ok(())
    })
}

#[test]
fn join_is_not_retroactive() -> AppResult<()> {
    run_async_test(async {
        let (tx, broadcast) = Broadcast::<u32>::channel(4);
        let (_early_tx, mut early) = broadcast.subscribe(4);
        tx.send(1)
            .await
            .map_err(|err| AppError::validation(format!("send failed: {}", err)))?;
        recv_within(&mut early).await?;

        let (_late_tx, mut late) = broadcast.subscribe(4);
        tx.send(2)
            .await
            .map_err(|err| AppError::validation(format!("send failed: {}", err)))?;
        if recv_within(&mut late).await? != 2 {
            return Err(AppError::validation("Late subscriber saw an old message"));
        }
        Ok(())
    })
}

#[test]
fn delivery_follows_join_order() -> AppResult<()> {
    run_async_test(async {
        let (tx, broadcast) = Broadcast::<u32>::channel(4);
        let (first_tx, mut first) = broadcast.subscribe(1);
        let (_second_tx, mut second) = broadcast.subscribe(4);

        // Fill the first subscriber so the forward has to wait on it.
        first_tx
            .send(0)
            .await
            .map_err(|err| AppError::validation(format!("prefill failed: {}", err)))?;
        tx.send(7)
            .await
            .map_err(|err| AppError::validation(format!("send failed: {}", err)))?;
        tokio::time::sleep(SETTLE).await;
        if !matches!(second.try_recv(), Err(TryRecvError::Empty)) {
            return Err(AppError::validation(
                "Second subscriber was served before the first accepted",
            ));
        }

        if recv_within(&mut first).await? != 0 || recv_within(&mut first).await? != 7 {
            return Err(AppError::validation("First subscriber order mismatch"));
        }
        if recv_within(&mut second).await? != 7 {
            return Err(AppError::validation("Second subscriber missed the message"));
        }
        Ok(())
    })
}

#[test]
fn leave_stops_delivery_to_that_subscriber_only() -> AppResult<()> {
    run_async_test(async {
        let (tx, broadcast) = Broadcast::<&'static str>::channel(4);
        let (_first_tx, mut first) = broadcast.subscribe(4);
        let (second_tx, mut second) = broadcast.subscribe(4);
        let (_third_tx, mut third) = broadcast.subscribe(4);

        if !broadcast.leave(&second_tx) {
            return Err(AppError::validation("Expected leave to find the subscriber"));
        }
        if broadcast.leave(&second_tx) {
            return Err(AppError::validation("Second leave must be a no-op"));
        }
        drop(second_tx);

        tx.send("pity da foo")
            .await
            .map_err(|err| AppError::validation(format!("send failed: {}", err)))?;
        if recv_within(&mut first).await? != "pity da foo"
            || recv_within(&mut third).await? != "pity da foo"
        {
            return Err(AppError::validation("Remaining subscribers missed the message"));
        }
        if second.recv().await.is_some() {
            return Err(AppError::validation("Departed subscriber still received"));
        }
        if broadcast.subscriber_count() != 2 {
            return Err(AppError::validation("Expected two subscribers"));
        }
        Ok(())
    })
}

#[test]
fn leave_and_close_keeps_forwarding_to_others() -> AppResult<()> {
    run_async_test(async {
        let (tx, broadcast) = Broadcast::<u32>::channel(4);
        let (first_tx, mut first) = broadcast.subscribe(4);
        let (_second_tx, mut second) = broadcast.subscribe(4);

        broadcast.leave_and_close(first_tx);
        tx.send(42)
            .await
            .map_err(|err| AppError::validation(format!("send failed: {}", err)))?;
        if recv_within(&mut second).await? != 42 {
            return Err(AppError::validation("Remaining subscriber missed the message"));
        }
        if first.recv().await.is_some() {
            return Err(AppError::validation("Closed subscriber should see end of stream"));
        }

        tx.send(43)
            .await
            .map_err(|err| AppError::validation(format!("send failed: {}", err)))?;
        if recv_within(&mut second).await? != 43 {
            return Err(AppError::validation("Forwarding stopped after leave_and_close"));
        }
        Ok(())
    })
}

#[test]
fn dropped_receiver_is_pruned() -> AppResult<()> {
    run_async_test(async {
        let (tx, broadcast) = Broadcast::<u32>::channel(4);
        let (_gone_tx, gone) = broadcast.subscribe(4);
        let (_kept_tx, mut kept) = broadcast.subscribe(4);
        drop(gone);

        tx.send(1)
            .await
            .map_err(|err| AppError::validation(format!("send failed: {}", err)))?;
        if recv_within(&mut kept).await? != 1 {
            return Err(AppError::validation("Live subscriber missed the message"));
        }
        if broadcast.subscriber_count() != 1 {
            return Err(AppError::validation("Closed subscriber was not pruned"));
        }
        Ok(())
    })
}

#[test]
fn forwarder_stops_when_inbound_closes() -> AppResult<()> {
    run_async_test(async {
        let (tx, rx) = mpsc::channel::<u32>(1);
        let (broadcast, forwarder) = Broadcast::spawn(rx);
        let (_sub_tx, _sub_rx) = broadcast.subscribe(1);
        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), forwarder)
            .await
            .map_err(|_| AppError::validation("Forwarder kept running"))?
            .map_err(|err| AppError::validation(format!("Forwarder panicked: {}", err)))?;
        Ok(())
    })
}
