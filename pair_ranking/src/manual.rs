/*!

This is the long-form manual for `pair_ranking` and `namerank`.

## The rating model

Every name of a list starts at 1000.0 points. Comparisons are folded in
the order they were appended to the log; for each one, the expected score
of side A is

```text
expectedA = 1 / (1 + 10^((ratingB - ratingA) / 400))
```

and both ratings move by `K * (actual - expected)` with `K = 32`. A win
scores 1, a loss 0, and a `both` outcome 0.5 for each side (a draw that
also increments both draw tallies). A `skip` outcome changes nothing at
all. Events that reference a deleted name, or a name against itself, are
dropped with a warning and counted as skipped.

The fold is pure: recomputing from the full log and applying events one
by one as they arrive produce the same board. Ratings are only comparable
within one list.

## Input formats for `import`

* `txt` (default) — one name per line; blank lines and surrounding
  whitespace are ignored.
* `csv` — the first column of each row is a name. No header expected.
* `xlsx` — the first column of a worksheet; `--excel-worksheet-name`
  selects the worksheet, defaulting to the first one.

## The list file

All state lives in a single JSON document, created by `import` and
rewritten on every append. The field names mirror the hosted tables the
data originally came from:

```json
{
  "list": {
    "title": "Baby names 2026",
    "description": null,
    "lastName": "Miller",
    "parentNames": null,
    "siblingNames": null,
    "tags": null,
    "visibility": "private",
    "preferredAttributes": null
  },
  "names": [
    { "id": 1, "name": "Anna" },
    { "id": 2, "name": "Bob" }
  ],
  "comparisons": [
    { "id": 1, "nameAId": 1, "nameBId": 2, "chosen": "a",
      "recordedAt": 1756387200000, "userId": null }
  ],
  "feedbackOptions": [
    { "id": 1, "label": "Sounds nice" }
  ],
  "feedback": [
    { "comparisonId": 1, "optionId": 1, "customReason": null }
  ]
}
```

`chosen` is one of `a`, `b`, `both`, `skip` (`neither` is accepted as an
alias of `skip`). Records with an unknown tag are ignored during
tabulation, with a warning, so a list file written by a newer tool still
tabulates.

## The summary output

`rank --out` writes a JSON summary: a `config` block echoing the list
settings and event counters, and a `rankings` array with one entry per
name (rating formatted with four decimals, win/loss/draw tallies as
strings). The format is deliberately stable so that a stored summary can
serve as a reference for `--reference` checks.

*/
