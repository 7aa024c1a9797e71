use super::DuelStore;
use crate::{aggregator::AntagonistEntry, error::DuelResult, types::compare_xuids};
use chrono::{DateTime, Utc};
use rusqlite::params;

impl DuelStore {
    /// Insert new opponents and overwrite known ones, in one transaction.
    ///
    /// An aggregation run covers the player's whole history, so stored
    /// counters are replaced rather than added to.
    pub fn upsert_antagonists(
        &self,
        player_xuid: &str,
        entries: &[AntagonistEntry],
    ) -> DuelResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO antagonist
                 (player_xuid, opponent_xuid, opponent_gamertag, times_killed,
                  times_killed_by, matches_against, last_encounter)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(player_xuid, opponent_xuid) DO UPDATE SET
                    opponent_gamertag = excluded.opponent_gamertag,
                    times_killed      = excluded.times_killed,
                    times_killed_by   = excluded.times_killed_by,
                    matches_against   = excluded.matches_against,
                    last_encounter    = excluded.last_encounter",
            )?;
            for e in entries {
                stmt.execute(params![
                    player_xuid,
                    e.opponent_xuid,
                    e.opponent_gamertag,
                    e.times_killed as i64,
                    e.times_killed_by as i64,
                    e.matches_against as i64,
                    e.last_encounter,
                ])?;
            }
        }
        tx.commit()?;
        log::debug!("player={player_xuid} store: upserted {} antagonists", entries.len());
        Ok(entries.len())
    }

    pub fn antagonists_for(&self, player_xuid: &str) -> DuelResult<Vec<AntagonistEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT opponent_xuid, opponent_gamertag, times_killed, times_killed_by,
                    matches_against, last_encounter
             FROM antagonist WHERE player_xuid = ?1",
        )?;
        let mut entries = stmt
            .query_map(params![player_xuid], |row| {
                Ok(AntagonistEntry {
                    opponent_xuid:     row.get(0)?,
                    opponent_gamertag: row.get(1)?,
                    times_killed:      row.get::<_, u32>(2)?,
                    times_killed_by:   row.get::<_, u32>(3)?,
                    matches_against:   row.get::<_, u32>(4)?,
                    last_encounter:    row.get::<_, DateTime<Utc>>(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by(|a, b| compare_xuids(&a.opponent_xuid, &b.opponent_xuid));
        Ok(entries)
    }

    pub fn antagonist_count(&self, player_xuid: &str) -> DuelResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM antagonist WHERE player_xuid = ?1",
            params![player_xuid],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DuelError;

    #[test]
    fn out_of_range_counters_are_rejected() {
        let store = DuelStore::in_memory().unwrap();
        store.migrate().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO antagonist
                 (player_xuid, opponent_xuid, opponent_gamertag, times_killed,
                  times_killed_by, matches_against, last_encounter)
                 VALUES ('100', '200', 'Two', -1, 0, 1, ?1)",
                params![Utc::now()],
            )
            .unwrap();

        let err = store.antagonists_for("100").unwrap_err();
        assert!(matches!(
            err,
            DuelError::Database(rusqlite::Error::IntegralValueOutOfRange(2, -1))
        ));
    }
}
