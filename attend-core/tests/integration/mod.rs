mod concurrency;
mod crash_recovery;
mod mint_scenarios;
mod storage_persistence;
