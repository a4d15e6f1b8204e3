//! Users and roles.

use abet_core::account::UserAccount;
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::Result;

const USER_SELECT: &str = "
  SELECT u.user_id, u.email, u.password_hash, r.role_name
    FROM users u JOIN roles r ON r.role_id = u.role_id";

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserAccount> {
  Ok(UserAccount {
    user_id:       row.get(0)?,
    email:         row.get(1)?,
    password_hash: row.get(2)?,
    role_name:     row.get(3)?,
  })
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<UserAccount>> {
  Ok(
    conn
      .query_row(
        &format!("{USER_SELECT} WHERE u.email = ?1 COLLATE NOCASE"),
        params![email.trim()],
        user_from_row,
      )
      .optional()?,
  )
}

pub fn get_user(conn: &Connection, user_id: i64) -> Result<Option<UserAccount>> {
  Ok(
    conn
      .query_row(&format!("{USER_SELECT} WHERE u.user_id = ?1"), params![user_id], user_from_row)
      .optional()?,
  )
}

pub fn set_password_hash(conn: &Connection, user_id: i64, hash: &str) -> Result<bool> {
  let changed = conn.execute(
    "UPDATE users SET password_hash = ?2 WHERE user_id = ?1",
    params![user_id, hash],
  )?;
  Ok(changed > 0)
}

pub fn upsert_user(
  conn: &mut Connection,
  email: &str,
  hash: &str,
  role_name: &str,
) -> Result<UserAccount> {
  let tx = conn.transaction()?;
  tx.execute("INSERT OR IGNORE INTO roles (role_name) VALUES (?1)", params![role_name])?;
  let role_id: i64 = tx.query_row(
    "SELECT role_id FROM roles WHERE role_name = ?1",
    params![role_name],
    |r| r.get(0),
  )?;
  tx.execute(
    "INSERT INTO users (email, password_hash, role_id) VALUES (?1, ?2, ?3)
     ON CONFLICT (email) DO UPDATE SET
       password_hash = excluded.password_hash,
       role_id       = excluded.role_id",
    params![email.trim().to_lowercase(), hash, role_id],
  )?;
  let user = find_by_email(&tx, email)?;
  tx.commit()?;
  user.ok_or(crate::Error::Sqlite(rusqlite::Error::QueryReturnedNoRows))
}
