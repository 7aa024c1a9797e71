use super::DuelStore;
use crate::{error::DuelResult, pair_reconstructor::KillVictimPair};
use rusqlite::params;

impl DuelStore {
    /// Replace the stored audit pairs of one match with a fresh reconstruction.
    pub fn replace_match_pairs(&self, match_id: &str, pairs: &[KillVictimPair]) -> DuelResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM kill_victim_pair WHERE match_id = ?1", params![match_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO kill_victim_pair
                 (match_id, seq, killer_xuid, killer_gamertag, victim_xuid, victim_gamertag, time_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (seq, p) in pairs.iter().enumerate() {
                stmt.execute(params![
                    match_id,
                    seq as i64,
                    p.killer_xuid,
                    p.killer_gamertag,
                    p.victim_xuid,
                    p.victim_gamertag,
                    p.time_ms,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Pairs of one match in reconstruction order.
    pub fn pairs_for_match(&self, match_id: &str) -> DuelResult<Vec<KillVictimPair>> {
        let mut stmt = self.conn.prepare(
            "SELECT killer_xuid, killer_gamertag, victim_xuid, victim_gamertag, time_ms
             FROM kill_victim_pair WHERE match_id = ?1
             ORDER BY seq ASC",
        )?;
        let pairs = stmt
            .query_map(params![match_id], |row| {
                Ok(KillVictimPair {
                    killer_xuid:     row.get(0)?,
                    killer_gamertag: row.get(1)?,
                    victim_xuid:     row.get(2)?,
                    victim_gamertag: row.get(3)?,
                    time_ms:         row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pairs)
    }

    pub fn pair_count(&self, match_id: &str) -> DuelResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM kill_victim_pair WHERE match_id = ?1",
            params![match_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
